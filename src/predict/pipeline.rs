//! Training, model selection and the persisted artifact
//!
//! Every family is trained on the same 80/20 split and scored on the held
//! out fifth; the highest-R² model is persisted together with the fitted
//! encoder so single-row predictions see exactly the training schema.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::features::{build_training_data, OneHotEncoder, PatientFeatures};
use super::metrics::{mean_absolute_error, r2_score, root_mean_squared_error};
use super::models::{
    DecisionTreeRegressor, GradientBoostingRegressor, KNeighborsRegressor, RidgeRegression,
    TrainedModel,
};
use crate::error::{EhrBoardError, Result};
use crate::models::Admission;
use crate::utils::progress::create_main_progress_bar;

/// Held-out evaluation scores of one model family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    pub name: String,
    pub r2: f64,
    pub mae: f64,
    pub rmse: f64,
}

/// The persisted model: fitted encoder, winning model and its scores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub encoder: OneHotEncoder,
    pub feature_names: Vec<String>,
    pub model: TrainedModel,
    pub score: ModelScore,
}

impl ModelArtifact {
    /// Persist the artifact as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        log::info!(
            "Saved best model ('{}') to {}",
            self.score.name,
            path.display()
        );
        Ok(())
    }

    /// Load a persisted artifact
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EhrBoardError::ModelNotFound(path.to_path_buf()));
        }
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Predict the length of stay for a single admission-feature row
    pub fn predict(&self, features: &PatientFeatures) -> Result<f64> {
        let row = self.encoder.transform(features).ok_or_else(|| {
            EhrBoardError::TrainingError(format!(
                "unknown severity tier: '{}'",
                features.severity
            ))
        })?;
        Ok(self.model.predict_row(&row))
    }
}

/// Shuffle row indices into train and test sets
#[must_use]
pub fn train_test_split(n: usize, test_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let n_test = ((n as f64) * test_ratio).round() as usize;
    let test = indices[..n_test].to_vec();
    let train = indices[n_test..].to_vec();
    (train, test)
}

#[derive(Debug, Clone, Copy)]
enum Family {
    Ridge,
    KNeighbors,
    DecisionTree,
    GradientBoosting,
}

const FAMILIES: [Family; 4] = [
    Family::Ridge,
    Family::KNeighbors,
    Family::DecisionTree,
    Family::GradientBoosting,
];

fn fit_family(family: Family, x: &[Vec<f64>], y: &[f64]) -> Option<TrainedModel> {
    match family {
        Family::Ridge => RidgeRegression::fit(x, y, 1.0).map(TrainedModel::Ridge),
        Family::KNeighbors => KNeighborsRegressor::fit(x, y, 5).map(TrainedModel::KNeighbors),
        Family::DecisionTree => {
            DecisionTreeRegressor::fit(x, y, 6, 10).map(TrainedModel::DecisionTree)
        }
        Family::GradientBoosting => {
            GradientBoostingRegressor::fit(x, y, 100, 0.1, 3).map(TrainedModel::GradientBoosting)
        }
    }
}

/// Train every model family, log a comparison and return the winner
///
/// Families train in parallel, capped at `parallelism` threads. The returned
/// score list is sorted best-first.
pub fn train_and_select(
    admissions: &[Admission],
    seed: u64,
    parallelism: usize,
) -> Result<(ModelArtifact, Vec<ModelScore>)> {
    let data = build_training_data(admissions)?;
    let (train_idx, test_idx) = train_test_split(data.x.len(), 0.2, seed);
    if test_idx.is_empty() {
        return Err(EhrBoardError::TrainingError(
            "test split is empty; need more admission rows".to_string(),
        ));
    }

    let x_train: Vec<Vec<f64>> = train_idx.iter().map(|&i| data.x[i].clone()).collect();
    let y_train: Vec<f64> = train_idx.iter().map(|&i| data.y[i]).collect();
    let x_test: Vec<Vec<f64>> = test_idx.iter().map(|&i| data.x[i].clone()).collect();
    let y_test: Vec<f64> = test_idx.iter().map(|&i| data.y[i]).collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallelism.max(1))
        .build()
        .map_err(|e| EhrBoardError::TrainingError(format!("thread pool: {e}")))?;

    let progress = create_main_progress_bar(FAMILIES.len() as u64, Some("training model families"));
    let mut trained: Vec<(TrainedModel, ModelScore)> = pool.install(|| {
        FAMILIES
            .par_iter()
            .filter_map(|&family| {
                let model = fit_family(family, &x_train, &y_train)?;
                let predictions: Vec<f64> =
                    x_test.iter().map(|row| model.predict_row(row)).collect();
                let score = ModelScore {
                    name: model.name().to_string(),
                    r2: r2_score(&y_test, &predictions),
                    mae: mean_absolute_error(&y_test, &predictions),
                    rmse: root_mean_squared_error(&y_test, &predictions),
                };
                progress.inc(1);
                Some((model, score))
            })
            .collect()
    });
    progress.finish_and_clear();

    if trained.is_empty() {
        return Err(EhrBoardError::TrainingError(
            "no model family could be trained".to_string(),
        ));
    }
    trained.sort_by(|a, b| b.1.r2.total_cmp(&a.1.r2));

    log::info!("--- model comparison (held-out split) ---");
    log::info!("{:<18} {:>8} {:>8} {:>8}", "model", "R2", "MAE", "RMSE");
    for (_, score) in &trained {
        log::info!(
            "{:<18} {:>8.4} {:>8.3} {:>8.3}",
            score.name,
            score.r2,
            score.mae,
            score.rmse
        );
    }

    let scores: Vec<ModelScore> = trained.iter().map(|(_, s)| s.clone()).collect();
    let (model, score) = trained.swap_remove(0);
    let artifact = ModelArtifact {
        encoder: data.encoder,
        feature_names: data.feature_names,
        model,
        score,
    };
    Ok((artifact, scores))
}
