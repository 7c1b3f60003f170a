#[cfg(target_os = "linux")]
mod bench {
    use iai::black_box;
    use probe_collections::{Int2IntHashMap, IntHashSet};

    const OPS: usize = 1_000;

    fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
        std::iter::from_fn(move || {
            s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
            Some(s)
        })
    }

    fn key(n: u64) -> i32 {
        (n >> 33) as i32
    }

    // Insert 1k entries, including growth.
    pub fn int_map_put_1000_ops() {
        let mut m = Int2IntHashMap::new(-1);
        for (i, x) in lcg(1).take(OPS).enumerate() {
            m.put(key(x), i as i32).unwrap();
        }
        black_box(m);
    }

    // Repeated hits on existing keys.
    pub fn int_map_get_hit_1000_ops() {
        let mut m = Int2IntHashMap::new(-1);
        let keys: Vec<i32> = lcg(7).take(OPS * 2).map(key).collect();
        for (i, &k) in keys.iter().enumerate() {
            m.put(k, i as i32).unwrap();
        }
        for &k in keys.iter().take(OPS) {
            black_box(m.get(k));
        }
    }

    // Repeated misses for keys unlikely to be present.
    pub fn int_map_get_miss_1000_ops() {
        let mut m = Int2IntHashMap::new(-1);
        for (i, x) in lcg(11).take(OPS).enumerate() {
            m.put(key(x), i as i32).unwrap();
        }
        for x in lcg(0xdead_beef).take(OPS) {
            black_box(m.get(key(x)));
        }
    }

    // Insert then remove the same key repeatedly.
    pub fn int_set_insert_remove_1000_ops() {
        let mut s = IntHashSet::new();
        for x in lcg(13).take(OPS) {
            s.insert(key(x));
            black_box(s.remove(key(x)));
        }
    }
}

#[cfg(target_os = "linux")]
use bench::{
    int_map_get_hit_1000_ops, int_map_get_miss_1000_ops, int_map_put_1000_ops,
    int_set_insert_remove_1000_ops,
};

#[cfg(target_os = "linux")]
iai::main!(
    int_map_put_1000_ops,
    int_map_get_hit_1000_ops,
    int_map_get_miss_1000_ops,
    int_set_insert_remove_1000_ops
);

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("Skipping: iai benches require Linux/valgrind.");
}
