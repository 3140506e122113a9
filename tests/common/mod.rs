//! Fixture helpers: experiment trees of checkpoint CSVs

use std::fs;
use std::path::Path;

/// Write `<root>/<directory>/runs/<experiment>/<time>.csv` for every
/// `(time, score)`, with a decoy row for another model in each file.
pub fn write_experiment(root: &Path, directory: &str, experiment: &str, points: &[(i64, f64)]) {
    let dir = root.join(directory).join("runs").join(experiment);
    fs::create_dir_all(&dir).unwrap();
    for (time, score) in points {
        let body = format!(
            "name,trueskill,elo\nmodels/decoy/{time}.pt,-1.0,0\nmodels/{experiment}/{time}.pt,{score},1000\n"
        );
        fs::write(dir.join(format!("{time}.csv")), body).unwrap();
    }
}
