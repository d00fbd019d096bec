//! Experiment runner: build or load a synthetic dataset, train or load the
//! GCN, compute or reload explanation masks, then score explanations
//! against planted-motif ground truth and append a run record to the
//! summary JSON.
//!
//! Usage:
//!   cargo run --release -p exgraph-train --bin explain_experiment -- --help

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde_json::json;

use exgraph_eval::{
    evaluate_explanation, eval_fidelity, DatasetVariant, FidelityParams, GroundTruth,
};
use exgraph_train::{
    build_synthetic, eval_related_pred, ExplainerKind, Gcn, GcnConfig, MaskStore, SynData,
    SyntheticConfig, TrainError,
};

/// Evaluate a GNN explainer against planted-motif ground truth
#[derive(Parser, Debug)]
#[command(name = "explain_experiment")]
#[command(about = "Train a GCN on a synthetic motif dataset and score an explainer against ground truth")]
struct Args {
    /// Dataset variant: syn1..syn6 or ba_shapes
    #[arg(long, default_value = "ba_shapes")]
    dataset: String,

    /// Directory for built datasets
    #[arg(long, default_value = "data")]
    data_save_dir: PathBuf,

    /// Directory for model checkpoints
    #[arg(long, default_value = "model")]
    model_save_dir: PathBuf,

    /// Directory for computed explanation masks
    #[arg(long, default_value = "mask")]
    mask_save_dir: PathBuf,

    /// Directory for run summaries
    #[arg(long, default_value = "result")]
    result_save_dir: PathBuf,

    /// Random seed for data building and training
    #[arg(long, default_value_t = 41)]
    seed: u64,

    /// Number of basis nodes (0 = variant default)
    #[arg(long, default_value_t = 0)]
    num_basis: usize,

    /// Number of planted motif instances
    #[arg(long, default_value_t = 150)]
    num_shapes: usize,

    /// GCN hidden dimension
    #[arg(long, default_value_t = 20)]
    hidden_dim: usize,

    /// Training epochs
    #[arg(long, default_value_t = 1000)]
    num_epochs: usize,

    /// Learning rate
    #[arg(long, default_value_t = 0.001)]
    lr: f32,

    /// Weight decay
    #[arg(long, default_value_t = 0.005)]
    weight_decay: f32,

    /// Number of motif nodes to explain
    #[arg(long, default_value_t = 50)]
    num_test_nodes: usize,

    /// Edges kept per explanation
    #[arg(long, default_value_t = 6)]
    num_top_edges: usize,

    /// Explainer: occlusion, distance or random
    #[arg(long, default_value = "occlusion")]
    explainer: String,

    /// Fraction of edges treated as unimportant in fidelity runs
    #[arg(long, default_value_t = 0.7)]
    sparsity: f64,
}

/// Storage locations for one run, built once at startup and passed down.
/// No global state; directories are created here and nowhere else.
struct PathConfig {
    data_dir: PathBuf,
    model_dir: PathBuf,
    mask_dir: PathBuf,
    result_dir: PathBuf,
}

impl PathConfig {
    fn new(args: &Args) -> Self {
        Self {
            data_dir: args.data_save_dir.join(&args.dataset),
            model_dir: args.model_save_dir.join(&args.dataset),
            mask_dir: args.mask_save_dir.join(&args.dataset),
            result_dir: args.result_save_dir.join(&args.dataset),
        }
    }

    fn ensure(&self) -> std::io::Result<()> {
        for dir in [&self.data_dir, &self.model_dir, &self.mask_dir, &self.result_dir] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // fail fast on unsupported names, before any work happens
    let variant: DatasetVariant = args
        .dataset
        .parse()
        .with_context(|| format!("invalid --dataset {}", args.dataset))?;
    let explainer: ExplainerKind = args
        .explainer
        .parse()
        .with_context(|| format!("invalid --explainer {}", args.explainer))?;

    let paths = PathConfig::new(&args);
    paths.ensure().context("creating output directories")?;
    let date = Local::now().format("%Y_%m_%d").to_string();

    let data = load_or_build_dataset(&args, variant, &paths)?;
    println!(
        "dataset {}: {} nodes, {} edge entries, {} classes",
        variant,
        data.num_nodes(),
        data.edge_index.len(),
        data.num_classes
    );

    let (model, acc) = load_or_train_model(&args, &data, &paths)?;
    println!("gcn test accuracy: {acc:.4}");

    // explain only nodes the model classifies correctly, inside the
    // planted region
    let probs = model.predict(&data.x, &data.edge_index);
    let pred = exgraph_train::argmax_rows(&probs);
    let test_nodes: Vec<usize> = (data.num_basis..data.num_nodes())
        .filter(|&i| pred[i] == data.y[i])
        .take(args.num_test_nodes)
        .collect();
    println!("explaining {} nodes", test_nodes.len());

    let store = load_or_compute_masks(&args, explainer, &model, &data, &test_nodes, &paths, &date)?;

    // accuracy against ground truth
    let gt = GroundTruth::with_region_start(variant, data.num_basis);
    let mut reports = Vec::new();
    let mut skipped = 0usize;
    for (node, scores) in store.edge_masks() {
        let truth = gt.ground_truth(node, &data.edge_index, data.num_nodes())?;
        match evaluate_explanation(&truth, &data.edge_index, &scores, args.num_top_edges, false) {
            Ok(report) => reports.push(report),
            Err(err) => {
                eprintln!("node {node}: {err}");
                skipped += 1;
            }
        }
    }
    let accuracy = json!({
        "recall": mean(reports.iter().map(|r| r.recall)),
        "precision": mean(reports.iter().map(|r| r.precision)),
        "f1": mean(reports.iter().map(|r| r.f1)),
        "ged": mean(reports.iter().map(|r| r.ged)),
        "auc": mean(reports.iter().map(|r| r.auc)),
        "scored_nodes": reports.len(),
        "skipped_nodes": skipped,
    });
    println!("accuracy: {accuracy}");

    // fidelity grid
    let masks = store.edge_masks();
    let mut fidelity_records = Vec::new();
    for hard_mask in [true, false] {
        let params = FidelityParams {
            sparsity: args.sparsity,
            normalize: true,
            hard_mask,
        };
        let preds = eval_related_pred(&model, &data, &masks, &params)?;
        let summary = preds.probability_summary()?;
        let fidelity = eval_fidelity(&preds, params)?;
        println!(
            "fidelity (hard_mask={hard_mask}): plus={:.4} minus={:.4}",
            fidelity.fidelity_plus, fidelity.fidelity_minus
        );
        fidelity_records.push(json!({
            "params": params,
            "probs": summary,
            "fidelity_plus": fidelity.fidelity_plus,
            "fidelity_minus": fidelity.fidelity_minus,
        }));
    }

    let entry = json!({
        "dataset": variant.to_string(),
        "explainer": explainer.name(),
        "num_test_nodes": test_nodes.len(),
        "gcn_test_acc": acc,
        "time": store.mean_runtime(),
        "accuracy": accuracy,
        "fidelity": fidelity_records,
    });
    let summary_path = paths.result_dir.join(format!("summary_{date}.json"));
    append_summary(&summary_path, entry)?;
    println!("summary written to {}", summary_path.display());

    Ok(())
}

fn load_or_build_dataset(args: &Args, variant: DatasetVariant, paths: &PathConfig) -> Result<SynData> {
    let data_path = paths.data_dir.join(format!("{variant}.bin"));
    if data_path.is_file() {
        return SynData::load(&data_path).context("loading dataset");
    }
    let mut config = SyntheticConfig::for_variant(variant);
    config.seed = args.seed;
    config.num_shapes = args.num_shapes;
    if args.num_basis != 0 {
        config.num_basis = args.num_basis;
    }
    let data = build_synthetic(&config).context("building dataset")?;
    data.save(&data_path).context("saving dataset")?;
    Ok(data)
}

fn load_or_train_model(args: &Args, data: &SynData, paths: &PathConfig) -> Result<(Gcn, f64)> {
    let model_path = paths.model_dir.join(format!("gcn_h{}.ckpt", args.hidden_dim));
    match Gcn::load_checkpoint(&model_path) {
        Ok((model, acc)) => Ok((model, acc)),
        Err(TrainError::CheckpointNotFound { .. }) => {
            println!("no checkpoint at {}, training", model_path.display());
            let config = GcnConfig {
                hidden_dim: args.hidden_dim,
                num_epochs: args.num_epochs,
                learning_rate: args.lr,
                weight_decay: args.weight_decay,
                seed: args.seed,
            };
            let mut model = Gcn::new(config, data.x.ncols(), data.num_classes);
            let history = model.train(data)?;
            model.save_checkpoint(&model_path, history.test_acc)?;
            Ok((model, history.test_acc))
        }
        Err(err) => Err(err).context("loading checkpoint"),
    }
}

fn load_or_compute_masks(
    args: &Args,
    explainer: ExplainerKind,
    model: &Gcn,
    data: &SynData,
    test_nodes: &[usize],
    paths: &PathConfig,
    date: &str,
) -> Result<MaskStore> {
    let mask_path = paths
        .mask_dir
        .join(format!("masks_{}_{date}.bin", explainer.name()));
    if mask_path.is_file() {
        println!("reusing masks from {}", mask_path.display());
        return MaskStore::load(&mask_path).context("loading masks");
    }

    let pb = ProgressBar::new(test_nodes.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} masks {elapsed}")
            .expect("static progress template"),
    );
    let results: Vec<_> = test_nodes
        .par_iter()
        .map(|&node| {
            let start = Instant::now();
            let scores = explainer.explain(model, data, node, args.seed);
            pb.inc(1);
            (node, scores, start.elapsed().as_secs_f64())
        })
        .collect();
    pb.finish_and_clear();

    let mut store = MaskStore::new(explainer.name());
    for (node, scores, runtime) in results {
        store.push(node, scores?, runtime);
    }
    store.save(&mask_path).context("saving masks")?;
    Ok(store)
}

fn append_summary(path: &Path, entry: serde_json::Value) -> Result<()> {
    let mut records: Vec<serde_json::Value> = if path.is_file() {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).context("reading existing summary")?
    } else {
        Vec::new()
    };
    records.push(entry);
    fs::write(path, serde_json::to_string_pretty(&records)?)?;
    Ok(())
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let collected: Vec<f64> = values.collect();
    if collected.is_empty() {
        0.0
    } else {
        collected.iter().sum::<f64>() / collected.len() as f64
    }
}
