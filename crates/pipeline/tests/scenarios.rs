mod common;

use flowmap_core::{Integrator, TimeGrid};
use flowmap_pipeline::{
    Bounds, Config, Error, Experiment, PairGroups, Source, presets, sampler::SampleError,
    sampler::sample, split::split,
};
use flowmap_solvers::transient::{self, Solver};
use flowmap_surrogate::TrainConfig;
use flowmap_systems::{Lorenz, Population};
use rand::{SeedableRng, rngs::StdRng};

use common::Blowup;

fn quick_train() -> TrainConfig {
    TrainConfig::new(2, 16, 0.1, 1e-3).unwrap()
}

#[test]
fn lorenz_dataset_splits_into_expected_pair_counts() {
    let config = presets::lorenz();
    let mut rng = StdRng::seed_from_u64(2024);

    let trajectories = sample(
        &Lorenz::default(),
        &Solver::default(),
        config.bounds(),
        config.grid(),
        config.trajectories(),
        &mut rng,
    )
    .unwrap();
    assert_eq!(trajectories.len(), 100);
    assert!(trajectories.iter().all(|t| t.len() == 10_000));

    let groups = PairGroups::from_trajectories(&trajectories);
    let split = split(groups.len(), config.split(), &mut rng).unwrap();
    let (train, test) = groups.partition(&split).unwrap();

    assert_eq!(train.len(), 799_920);
    assert_eq!(test.len(), 199_980);
    assert!(train.trajectories().is_disjoint(&test.trajectories()));
}

#[test]
fn population_run_reports_expected_pair_counts() {
    let config = presets::population()
        .with_seed(Some(7))
        .with_train(quick_train());

    let report = Experiment::new(Population::default(), Solver::default(), config)
        .run()
        .unwrap();

    assert_eq!(report.dataset, Source::Generated);
    assert_eq!(report.model, Source::Generated);
    assert_eq!(report.train_pairs, 79_920);
    assert_eq!(report.test_pairs, 19_980);
    assert_eq!(report.history.unwrap().epochs.len(), 2);

    let metrics = report.metrics.unwrap();
    assert!(metrics.mse.is_finite() && metrics.mae.is_finite());
}

#[test]
fn rollout_is_seeded_from_a_test_trajectory() {
    let grid = TimeGrid::new(0.0, 100.0, 101).unwrap();
    let config = presets::population()
        .with_grid(grid)
        .with_trajectories(10)
        .unwrap()
        .with_seed(Some(3))
        .with_train(quick_train());

    let report = Experiment::new(Population::default(), Solver::default(), config)
        .run()
        .unwrap();

    let rollout = report.rollout.unwrap();
    assert_eq!(rollout.states.len(), grid.len() + 1);
    assert_eq!(rollout.reference.len(), grid.len());
    assert_eq!(&rollout.states[0], rollout.reference.initial());
    assert_eq!(rollout.comparison.per_step.len(), grid.len());
    assert_eq!(rollout.comparison.per_step[0], 0.0);

    let expected = Solver::default()
        .integrate(&Population::default(), rollout.states[0], &grid)
        .unwrap();
    assert_eq!(rollout.reference, expected);
}

#[test]
fn whole_split_leaves_nothing_to_evaluate() {
    let config = presets::population()
        .with_grid(TimeGrid::new(0.0, 20.0, 21).unwrap())
        .with_trajectories(5)
        .unwrap()
        .with_split(1.0)
        .unwrap()
        .with_seed(Some(1))
        .with_train(quick_train());

    let report = Experiment::new(Population::default(), Solver::default(), config)
        .run()
        .unwrap();

    assert_eq!(report.train_pairs, 100);
    assert_eq!(report.test_pairs, 0);
    assert!(report.metrics.is_none());
    assert!(report.rollout.is_none());
}

#[test]
fn integration_failure_ends_the_run() {
    let config = Config::new(
        [Bounds::new(1.0, 2.0).unwrap()],
        TimeGrid::new(0.0, 5.0, 51).unwrap(),
    )
    .with_trajectories(4)
    .unwrap()
    .with_seed(Some(0));

    let result = Experiment::new(Blowup, Solver::default(), config).run();

    assert!(matches!(
        result,
        Err(Error::Sample(SampleError::Integration { trajectory: 0, .. }))
    ));
}

#[test]
fn sampling_stops_at_the_first_failing_trajectory() {
    let bounds = [Bounds::new(1.0, 2.0).unwrap()];
    let grid = TimeGrid::new(0.0, 2.0, 201).unwrap();

    let result = sample(
        &Blowup,
        &Solver::default(),
        &bounds,
        &grid,
        3,
        &mut StdRng::seed_from_u64(0),
    );

    match result {
        Err(SampleError::Integration {
            trajectory, source, ..
        }) => {
            assert_eq!(trajectory, 0);
            assert!(matches!(
                source.downcast_ref::<transient::Error>(),
                Some(transient::Error::NonFinite { .. })
            ));
        }
        other => panic!("expected an integration error, got {other:?}"),
    }
}
