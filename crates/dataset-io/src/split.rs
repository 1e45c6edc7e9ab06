//! Train/test split of sample names.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::error::DatasetError;
use crate::writer::{write_text, DatasetLayout};

pub const DEFAULT_TRAIN_RATIO: f64 = 0.8;

/// Shuffle `names` and cut them at `ratio`. Returns (train, test).
pub fn split_names<R: Rng + ?Sized>(
    mut names: Vec<String>,
    ratio: f64,
    rng: &mut R,
) -> (Vec<String>, Vec<String>) {
    names.shuffle(rng);
    let cut = ((names.len() as f64) * ratio.clamp(0.0, 1.0)).floor() as usize;
    let test = names.split_off(cut.min(names.len()));
    (names, test)
}

/// Write `train.txt` and `test.txt` under the dataset root, one name per line.
pub fn write_split<R: Rng + ?Sized>(
    layout: &DatasetLayout,
    ratio: f64,
    rng: &mut R,
) -> Result<(usize, usize), DatasetError> {
    let (train, test) = split_names(layout.sample_names()?, ratio, rng);
    write_text(&layout.root.join("train.txt"), &lines(&train))?;
    write_text(&layout.root.join("test.txt"), &lines(&test))?;
    info!(train = train.len(), test = test.len(), "split written");
    Ok((train.len(), test.len()))
}

fn lines(names: &[String]) -> String {
    names.iter().map(|n| format!("{n}\n")).collect()
}
