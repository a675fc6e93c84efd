use ember_engine::pool::{ObjectPool, PoolConfig, PoolStats};

use crate::entities::{Bullet, Coin, DamageNumber, Particle};

/// Every pool the arcade uses, owned by the app and lent to the world each
/// frame.
pub struct Pools {
    pub particles: ObjectPool<Particle>,
    pub bullets: ObjectPool<Bullet>,
    pub damage_numbers: ObjectPool<DamageNumber>,
    pub coins: ObjectPool<Coin>,
}

impl Pools {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            particles: ObjectPool::with_config(Particle::default, Particle::reset, config),
            bullets: ObjectPool::with_config(Bullet::default, Bullet::reset, config),
            damage_numbers: ObjectPool::with_config(
                DamageNumber::default,
                DamageNumber::reset,
                config,
            ),
            coins: ObjectPool::with_config(Coin::default, Coin::reset, config),
        }
    }

    pub fn report(&self) -> PoolReport {
        PoolReport {
            particles: self.particles.stats(),
            bullets: self.bullets.stats(),
            damage_numbers: self.damage_numbers.stats(),
            coins: self.coins.stats(),
        }
    }
}

impl Default for Pools {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PoolReport {
    pub particles: PoolStats,
    pub bullets: PoolStats,
    pub damage_numbers: PoolStats,
    pub coins: PoolStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pools_are_prewarmed() {
        let pools = Pools::default();
        assert_eq!(pools.particles.size(), 50);
        assert_eq!(pools.bullets.size(), 50);
        assert_eq!(pools.damage_numbers.size(), 50);
        assert_eq!(pools.coins.size(), 50);
    }

    #[test]
    fn released_particle_comes_back_idle() {
        let mut pools = Pools::default();
        let mut p = pools.particles.acquire();
        p.life = 1.0;
        p.size = 6.0;
        pools.particles.release(p);

        // Most recently released is handed out next.
        let again = pools.particles.acquire();
        assert_eq!(again.life, 0.0);
        assert_eq!(again, Particle::default());
    }

    #[test]
    fn particle_pool_caps_idle_entries() {
        let mut pools = Pools::default();
        pools
            .particles
            .release_all((0..1000).map(|_| Particle::default()));
        assert_eq!(pools.particles.size(), 500);
        assert_eq!(pools.report().particles.discarded, 550);
    }
}
