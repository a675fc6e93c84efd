use std::fmt;

/// Pool sizing.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PoolConfig {
    /// Instances created eagerly at construction.
    pub initial_size: usize,

    /// Hard cap on the idle set. Releases beyond the cap are dropped.
    pub max_idle: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_size: 50,
            max_idle: 500,
        }
    }
}

/// Lifetime counters, for diagnostics only.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct PoolStats {
    /// Instances built by the factory (pre-warm included).
    pub created: u64,
    /// `acquire` calls served from the idle set.
    pub reused: u64,
    /// Released instances dropped because the idle set was full.
    pub discarded: u64,
}

/// Cache of reset-to-default instances of `T`.
///
/// Checked-out instances are owned by the caller; the pool only ever holds idle
/// ones. None of the operations fail: an empty pool falls back to the factory
/// and a full pool drops what it is given.
pub struct ObjectPool<T> {
    idle: Vec<T>,
    factory: Box<dyn Fn() -> T>,
    reset: Box<dyn Fn(&mut T)>,
    max_idle: usize,
    stats: PoolStats,
}

impl<T> ObjectPool<T> {
    /// Creates a pool with the default cap (500) and `initial_size` pre-warmed instances.
    pub fn new<F, R>(factory: F, reset: R, initial_size: usize) -> Self
    where
        F: Fn() -> T + 'static,
        R: Fn(&mut T) + 'static,
    {
        Self::with_config(
            factory,
            reset,
            PoolConfig {
                initial_size,
                ..PoolConfig::default()
            },
        )
    }

    pub fn with_config<F, R>(factory: F, reset: R, config: PoolConfig) -> Self
    where
        F: Fn() -> T + 'static,
        R: Fn(&mut T) + 'static,
    {
        let prewarm = config.initial_size.min(config.max_idle);
        let mut idle = Vec::with_capacity(prewarm);
        idle.extend((0..prewarm).map(|_| factory()));

        Self {
            idle,
            factory: Box::new(factory),
            reset: Box::new(reset),
            max_idle: config.max_idle,
            stats: PoolStats {
                created: prewarm as u64,
                ..PoolStats::default()
            },
        }
    }

    /// Returns an idle instance, or a fresh one when the idle set is empty.
    pub fn acquire(&mut self) -> T {
        match self.idle.pop() {
            Some(item) => {
                self.stats.reused += 1;
                item
            }
            None => {
                self.stats.created += 1;
                (self.factory)()
            }
        }
    }

    /// Resets `item` and keeps it for reuse if the idle set has room.
    pub fn release(&mut self, mut item: T) {
        (self.reset)(&mut item);

        if self.idle.len() < self.max_idle {
            self.idle.push(item);
        } else {
            self.stats.discarded += 1;
        }
    }

    /// Releases every item in order.
    pub fn release_all<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        for item in items {
            self.release(item);
        }
    }

    /// Current idle count.
    #[inline]
    pub fn size(&self) -> usize {
        self.idle.len()
    }

    /// Idle-set cap.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_idle
    }

    #[inline]
    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

impl<T> fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("idle", &self.idle.len())
            .field("max_idle", &self.max_idle)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Particle {
        id: u32,
        life: f32,
        x: f32,
        visible: bool,
    }

    fn particle_pool(initial: usize) -> ObjectPool<Particle> {
        let next_id = Rc::new(Cell::new(0u32));
        ObjectPool::new(
            move || {
                let id = next_id.get();
                next_id.set(id + 1);
                Particle { id, ..Particle::default() }
            },
            |p: &mut Particle| {
                p.life = 0.0;
                p.x = 0.0;
                p.visible = false;
            },
            initial,
        )
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn prewarms_initial_size() {
        let pool = particle_pool(50);
        assert_eq!(pool.size(), 50);
        assert_eq!(pool.stats().created, 50);
    }

    #[test]
    fn default_config_matches_documented_values() {
        let cfg = PoolConfig::default();
        assert_eq!(cfg.initial_size, 50);
        assert_eq!(cfg.max_idle, 500);
        assert_eq!(particle_pool(0).capacity(), 500);
    }

    #[test]
    fn prewarm_is_bounded_by_cap() {
        let pool = ObjectPool::with_config(
            Particle::default,
            |_p: &mut Particle| {},
            PoolConfig { initial_size: 20, max_idle: 8 },
        );
        assert_eq!(pool.size(), 8);
    }

    // ── acquire ───────────────────────────────────────────────────────────

    #[test]
    fn drains_then_falls_back_to_factory() {
        let mut pool = particle_pool(50);

        let held: Vec<Particle> = (0..50).map(|_| pool.acquire()).collect();
        assert_eq!(pool.size(), 0);

        let extra = pool.acquire();
        assert_eq!(pool.size(), 0);
        assert!(held.iter().all(|p| p.id != extra.id));
        assert_eq!(pool.stats().created, 51);
        assert_eq!(pool.stats().reused, 50);
    }

    #[test]
    fn live_instances_are_distinct() {
        let mut pool = particle_pool(4);
        let held: Vec<Particle> = (0..10).map(|_| pool.acquire()).collect();

        let mut ids: Vec<u32> = held.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), held.len());
    }

    #[test]
    fn released_instance_is_reused() {
        let mut pool = particle_pool(0);
        let p = pool.acquire();
        let id = p.id;
        pool.release(p);
        assert_eq!(pool.acquire().id, id);
    }

    // ── release ───────────────────────────────────────────────────────────

    #[test]
    fn release_resets_transient_fields() {
        let mut pool = particle_pool(0);
        let mut p = pool.acquire();
        p.life = 1.5;
        p.x = 42.0;
        p.visible = true;
        pool.release(p);

        let again = pool.acquire();
        assert_eq!(again.life, 0.0);
        assert_eq!(again.x, 0.0);
        assert!(!again.visible);
    }

    #[test]
    fn idle_set_never_exceeds_cap() {
        let mut pool = particle_pool(0);
        let items: Vec<Particle> = (0..1000).map(|_| pool.acquire()).collect();

        for item in items {
            pool.release(item);
            assert!(pool.size() <= 500);
        }
        assert_eq!(pool.size(), 500);
        assert_eq!(pool.stats().discarded, 500);
    }

    #[test]
    fn release_all_matches_repeated_release() {
        let mut pool = particle_pool(0);
        let items: Vec<Particle> = (0..12)
            .map(|_| {
                let mut p = pool.acquire();
                p.life = 3.0;
                p
            })
            .collect();

        pool.release_all(items);
        assert_eq!(pool.size(), 12);
        for _ in 0..12 {
            assert_eq!(pool.acquire().life, 0.0);
        }
    }

    #[test]
    fn reset_runs_even_when_discarded() {
        let resets = Rc::new(Cell::new(0usize));
        let counter = resets.clone();
        let mut pool = ObjectPool::with_config(
            Particle::default,
            move |_p: &mut Particle| counter.set(counter.get() + 1),
            PoolConfig { initial_size: 0, max_idle: 1 },
        );

        pool.release(Particle::default());
        pool.release(Particle::default());
        assert_eq!(resets.get(), 2);
        assert_eq!(pool.size(), 1);
    }
}
