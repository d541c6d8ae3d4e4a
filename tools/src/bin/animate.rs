//! animate: GIF animations of the snapshot sequences.
//!
//! Usage:
//!   animate [--root dir] [--results dir] [--fps N]
//!
//! Writes animation_sequential.gif and animation_parallel.gif for every run
//! found under <root>, and side_by_side.gif when both runs are present.

use anyhow::Result;
use epidemic_core::{
    engine::RunOutput,
    render::animation::{create_animation, create_side_by_side_animation, DEFAULT_FPS},
    snapshot::SnapshotSequence,
    timing::ExecutionTime,
};
use sir_tools::args::{arg_value, parse_arg};
use std::{env, fs, path::PathBuf};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let root = PathBuf::from(arg_value(&args, "--root").unwrap_or("."));
    let results = arg_value(&args, "--results")
        .map(PathBuf::from)
        .unwrap_or_else(|| root.join("results"));
    let fps = parse_arg(&args, "--fps", DEFAULT_FPS);
    fs::create_dir_all(&results)?;

    println!("Generating animations...");
    let sequential = RunOutput::in_dir(root.join("sequential").join("output"));
    let parallel = RunOutput::in_dir(root.join("parallel").join("output"));

    let seq_frames = load_if_present(&sequential)?;
    let par_frames = load_if_present(&parallel)?;

    if let Some(frames) = &seq_frames {
        let output = results.join("animation_sequential.gif");
        create_animation(frames, "SIR simulation - Sequential", &output, fps)?;
        println!("Animation saved: {}", output.display());
    }
    if let Some(frames) = &par_frames {
        let output = results.join("animation_parallel.gif");
        create_animation(frames, "SIR simulation - Parallel", &output, fps)?;
        println!("Animation saved: {}", output.display());
    }
    if let (Some(seq), Some(par)) = (&seq_frames, &par_frames) {
        let time_seq = ExecutionTime::load(&sequential.timing_file)?;
        let time_par = ExecutionTime::load(&parallel.timing_file)?;
        let output = results.join("side_by_side.gif");
        create_side_by_side_animation(seq, par, time_seq.seconds, time_par.seconds, &output, fps)?;
        println!("Side-by-side animation saved: {}", output.display());
    }
    if seq_frames.is_none() && par_frames.is_none() {
        log::warn!("No snapshot directories found under {}", root.display());
    }

    println!();
    println!("All animations generated.");
    Ok(())
}

fn load_if_present(run: &RunOutput) -> Result<Option<SnapshotSequence>> {
    if !run.snapshot_dir.is_dir() {
        return Ok(None);
    }
    Ok(Some(SnapshotSequence::load(&run.snapshot_dir)?))
}
