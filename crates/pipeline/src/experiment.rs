//! End-to-end runs: sample, split, train, score and roll out.
//!
//! # Algorithm
//!
//! 1. Restore the pair dataset from storage, or sample trajectories, slice
//!    them into pair groups and store those.
//! 2. Restore the trajectory split stored with a restored dataset, or draw a
//!    new one and store it. Flatten the groups into train and test datasets.
//! 3. Restore the surrogate from storage, or train one on the train dataset
//!    and store it.
//! 4. Score one-step predictions on the test dataset.
//! 5. Roll the surrogate out from the first test trajectory's initial state
//!    and compare it with a fresh integration from the same state.
//!
//! A stored artifact that exists is always used. It is never merged with or
//! updated by a new run. A freshly sampled dataset always gets a fresh split,
//! replacing any split left in storage.

use std::iter;

use log::{info, warn};
use rand::Rng;

use flowmap_core::{Dataset, Integrator, Observer, Predict, State, Trajectory, VectorField};
use flowmap_observers::{LogProgress, Patience};
use flowmap_surrogate::{
    Dense, History, Surrogate,
    train::{self, Status},
};

use crate::{
    config::Config,
    error::Error,
    evaluate::{Metrics, RolloutComparison, compare_rollout, score},
    pairs::PairGroups,
    persist::{self, DATASET_KEY, MODEL_KEY, PairArrays, PersistError, SPLIT_KEY},
    rollout,
    sampler::{self, SampleError},
    split::{self, Split},
    storage::Storage,
};

/// Where an artifact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Computed during this run.
    Generated,

    /// Read back from storage.
    Restored,
}

/// A surrogate ready for use, with its provenance.
#[derive(Debug, Clone)]
pub struct Trained<const N: usize> {
    pub surrogate: Surrogate<N>,
    pub source: Source,

    /// The training record, absent when the surrogate was restored.
    pub history: Option<History>,
}

/// A rollout alongside the integration it approximates.
#[derive(Debug, Clone)]
pub struct RolloutReport<const N: usize> {
    /// Index of the test trajectory whose initial state seeded the rollout.
    pub trajectory: usize,

    /// The rollout, seed first, one state longer than the grid.
    pub states: Vec<State<N>>,

    /// The integrated reference from the same seed.
    pub reference: Trajectory<N>,

    pub comparison: RolloutComparison<N>,
}

/// Outcome of [`Experiment::run`].
#[derive(Debug, Clone)]
pub struct Report<const N: usize> {
    pub dataset: Source,
    pub split: Split,
    pub model: Source,
    pub train_pairs: usize,
    pub test_pairs: usize,
    pub surrogate: Surrogate<N>,
    pub history: Option<History>,

    /// One-step metrics on the test set, absent when it is empty.
    pub metrics: Option<Metrics>,

    /// Absent when the test set is empty.
    pub rollout: Option<RolloutReport<N>>,
}

/// A configured pipeline over one vector field.
#[derive(Debug)]
pub struct Experiment<F, I, S, const N: usize> {
    field: F,
    integrator: I,
    config: Config<N>,
    storage: S,
}

impl<F, I, const N: usize> Experiment<F, I, (), N>
where
    F: VectorField<N>,
    I: Integrator<N>,
{
    /// Creates an experiment that persists nothing.
    pub fn new(field: F, integrator: I, config: Config<N>) -> Self {
        Self {
            field,
            integrator,
            config,
            storage: (),
        }
    }
}

impl<F, I, S, const N: usize> Experiment<F, I, S, N>
where
    F: VectorField<N>,
    I: Integrator<N>,
    S: Storage,
{
    /// Uses `storage` for the dataset and model artifacts.
    pub fn with_storage<T: Storage>(self, storage: T) -> Experiment<F, I, T, N> {
        Experiment {
            field: self.field,
            integrator: self.integrator,
            config: self.config,
            storage,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config<N> {
        &self.config
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn stored(&self, key: &'static str) -> Result<bool, PersistError> {
        self.storage
            .exists(key)
            .map_err(|source| PersistError::Storage { key, source })
    }

    /// Returns the per-trajectory pair groups, restored or freshly sampled.
    ///
    /// # Errors
    ///
    /// Returns an error if sampling fails, or if a stored dataset cannot be
    /// read or does not have the configured shape.
    pub fn dataset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(PairGroups<N>, Source), Error> {
        let variables = self.field.variables();

        if self.stored(DATASET_KEY)? {
            let expected = (self.config.trajectories(), self.config.grid().len() - 1);
            let groups = persist::load_dataset(&self.storage)?.into_groups(variables, expected)?;
            info!(
                "restored {} trajectories ({} pairs) from storage",
                groups.len(),
                groups.pair_count()
            );
            return Ok((groups, Source::Restored));
        }

        info!(
            "sampling {} trajectories over {} grid points",
            self.config.trajectories(),
            self.config.grid().len()
        );
        let trajectories = sampler::sample(
            &self.field,
            &self.integrator,
            self.config.bounds(),
            self.config.grid(),
            self.config.trajectories(),
            rng,
        )?;
        let groups = PairGroups::from_trajectories(&trajectories);
        info!("built {} pairs", groups.pair_count());

        if !self.storage.discards_writes() {
            persist::save_dataset(&mut self.storage, &PairArrays::from_groups(&groups, variables)?)?;
            info!("stored dataset as {DATASET_KEY}");
        }

        Ok((groups, Source::Generated))
    }

    /// Returns the train/test split of `groups`.
    ///
    /// The split stored with a restored dataset is reused, so a restored model
    /// is never tested on trajectories it trained on. Otherwise the indices are
    /// shuffled with `rng` and the new split is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored split cannot be read, does not cover the
    /// groups, or trains on another number of trajectories than configured.
    pub fn split<R: Rng + ?Sized>(
        &mut self,
        groups: &PairGroups<N>,
        dataset: Source,
        rng: &mut R,
    ) -> Result<(Split, Source), Error> {
        let n = groups.len();

        if dataset == Source::Restored && self.stored(SPLIT_KEY)? {
            let split = persist::load_split(&self.storage, n)?;
            let expected = split::train_count(n, self.config.split())?;
            if split.train().len() != expected {
                return Err(Error::SplitMismatch {
                    expected,
                    found: split.train().len(),
                });
            }
            info!("restored split of {n} trajectories from storage");
            return Ok((split, Source::Restored));
        }

        if dataset == Source::Restored && self.stored(MODEL_KEY)? {
            warn!(
                "no split stored with the dataset, the stored model may be tested on its training data"
            );
        }

        let split = split::split(n, self.config.split(), rng)?;
        if !self.storage.discards_writes() {
            persist::save_split(&mut self.storage, &split)?;
            info!("stored split as {SPLIT_KEY}");
        }

        Ok((split, Source::Generated))
    }

    /// Returns the surrogate, restored or trained on `train_set`.
    ///
    /// # Errors
    ///
    /// Returns an error if training fails, or if a stored model cannot be read
    /// or does not have the configured architecture.
    pub fn surrogate<R: Rng + ?Sized>(
        &mut self,
        train_set: &Dataset<N>,
        rng: &mut R,
    ) -> Result<Trained<N>, Error> {
        let expected = self.config.architecture().widths(N);

        if self.stored(MODEL_KEY)? {
            let network = persist::load_model(&self.storage)?;
            let found: Vec<usize> = iter::once(network.inputs())
                .chain(network.layers().iter().map(Dense::outputs))
                .collect();
            if found != expected {
                return Err(Error::ModelMismatch { expected, found });
            }

            info!("restored surrogate from storage, skipping training");
            return Ok(Trained {
                surrogate: Surrogate::from_network(network)?,
                source: Source::Restored,
                history: None,
            });
        }

        let mut surrogate = Surrogate::new(self.config.architecture(), rng)?;
        info!(
            "training {expected:?} surrogate on {} pairs for {} epochs",
            train_set.len(),
            self.config.train().epochs()
        );

        let mut progress = LogProgress::default();
        let mut patience = self.config.patience().map(Patience::new);
        let observer = |event: &train::Event| -> Option<train::Action> {
            let _: Option<train::Action> = progress.observe(event);
            patience.as_mut().and_then(|p| p.observe(event))
        };
        let history = surrogate.train(train_set, self.config.train(), rng, observer)?;

        if history.status == Status::StoppedByObserver {
            info!("stopped early after {} epochs", history.epochs.len());
        }

        if !self.storage.discards_writes() {
            persist::save_model(&mut self.storage, surrogate.network())?;
            info!("stored surrogate as {MODEL_KEY}");
        }

        Ok(Trained {
            surrogate,
            source: Source::Generated,
            history: Some(history),
        })
    }

    /// Rolls `model` out from `seed` and compares it with the integrator.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference integration fails.
    pub fn compare<M: Predict<N>>(
        &self,
        model: &M,
        trajectory: usize,
        seed: State<N>,
    ) -> Result<Option<RolloutReport<N>>, Error> {
        let grid = self.config.grid();
        let states = rollout::rollout(model, seed, grid);

        let reference = self
            .integrator
            .integrate(&self.field, seed, grid)
            .map_err(|source| SampleError::Integration {
                trajectory,
                initial: seed.iter().copied().collect(),
                source: Box::new(source),
            })?;

        let Some(comparison) = compare_rollout(&states, reference.states()) else {
            return Ok(None);
        };

        info!(
            "rollout from trajectory {trajectory}: mean abs error {:.6e}, final abs error {:?}",
            comparison.mean_error(),
            comparison.final_error
        );
        if let Some(step) = comparison.first_non_finite {
            warn!("rollout became non-finite at step {step}");
        }

        Ok(Some(RolloutReport {
            trajectory,
            states,
            reference,
            comparison,
        }))
    }

    /// Runs the whole pipeline with the configured random source.
    ///
    /// # Errors
    ///
    /// Returns the first error from any stage.
    pub fn run(&mut self) -> Result<Report<N>, Error> {
        let mut rng = self.config.rng();

        let (groups, dataset) = self.dataset(&mut rng)?;
        let (split, _) = self.split(&groups, dataset, &mut rng)?;

        let seed = split
            .test()
            .first()
            .and_then(|&index| groups.get(index))
            .and_then(|group| group.pairs().first())
            .map(|pair| (pair.trajectory, pair.input));

        let (train, test) = groups.partition(&split)?;
        info!(
            "split {} train / {} test trajectories into {} / {} pairs",
            split.train().len(),
            split.test().len(),
            train.len(),
            test.len()
        );

        let trained = self.surrogate(&train, &mut rng)?;

        let metrics = score(&test, &trained.surrogate);
        let rollout = match (metrics, seed) {
            (Some(m), Some((trajectory, seed))) => {
                info!("test mse={:.6e} mae={:.6e} r2={:.6}", m.mse, m.mae, m.r2);
                self.compare(&trained.surrogate, trajectory, seed)?
            }
            _ => {
                warn!("test set is empty, skipping evaluation and rollout");
                None
            }
        };

        Ok(Report {
            dataset,
            split,
            model: trained.source,
            train_pairs: train.len(),
            test_pairs: test.len(),
            surrogate: trained.surrogate,
            history: trained.history,
            metrics,
            rollout,
        })
    }
}
