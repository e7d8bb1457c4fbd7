//! Benchmark for ray casting and voxel destruction.
//!
//! TARGET: a radius 32 detonation in dirt within one 50 ms server tick
//!
//! Run with: cargo bench --package blastforge_core --bench explosion_benchmark

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use blastforge_core::sandbox::{Material, MaterialResistance, SandboxWorld};
use blastforge_core::{
    Accuracy, BlockBlastParams, DestructionRayCaster, EngineConfig, Explosion, ExplosionEngine,
    PackedOffsetKey,
};
use blastforge_shared::{Vec3, VoxelPos};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn dirt_cube(half: i32) -> SandboxWorld {
    SandboxWorld::filled(
        VoxelPos::new(-half, -half, -half),
        VoxelPos::new(half, half, half),
        Material::Dirt,
    )
}

fn benchmark_directions(c: &mut Criterion) {
    let mut group = c.benchmark_group("ray_directions");
    for radius in [8, 32, 64] {
        for accuracy in [Accuracy::Fast, Accuracy::Precise] {
            group.bench_with_input(
                BenchmarkId::new(format!("{accuracy:?}"), radius),
                &radius,
                |b, &radius| {
                    b.iter(|| black_box(DestructionRayCaster::new(radius, accuracy).direction_count()));
                },
            );
        }
    }
    group.finish();
}

fn benchmark_gather(c: &mut Criterion) {
    let mut group = c.benchmark_group("gather");
    group.sample_size(10);
    for radius in [8, 16, 32] {
        let world = dirt_cube(radius * 2);
        for accuracy in [Accuracy::Fast, Accuracy::Precise] {
            let engine = ExplosionEngine::new(EngineConfig::default().with_accuracy(accuracy));
            let explosion = Explosion::new(Vec3::new(0.5, 0.5, 0.5), radius);
            group.bench_with_input(
                BenchmarkId::new(format!("{accuracy:?}"), radius),
                &radius,
                |b, _| {
                    let mut rng = ChaCha8Rng::seed_from_u64(7);
                    b.iter(|| {
                        let keys: Vec<PackedOffsetKey> = engine.gather(
                            &explosion,
                            &world,
                            &MaterialResistance,
                            &BlockBlastParams::default(),
                            &mut rng,
                            |_, _, _, _| true,
                        );
                        black_box(keys.len())
                    });
                },
            );
        }
    }
    group.finish();
}

fn benchmark_step_factor(c: &mut Criterion) {
    let world = dirt_cube(40);
    let mut group = c.benchmark_group("step_factor");
    group.sample_size(10);
    for factor in [0.3_f32, 0.45, 0.6] {
        let engine = ExplosionEngine::new(EngineConfig::default().with_step_factor(factor));
        group.bench_function(format!("radius_20_factor_{factor}"), |b| {
            let mut rng = ChaCha8Rng::seed_from_u64(11);
            b.iter(|| {
                let mut scratch = world.clone();
                let mut explosion = Explosion::new(Vec3::ZERO, 20);
                black_box(engine.destroy_voxels(
                    &mut explosion,
                    &mut scratch,
                    &MaterialResistance,
                    &BlockBlastParams::default(),
                    &mut rng,
                ))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_directions, benchmark_gather, benchmark_step_factor);
criterion_main!(benches);
