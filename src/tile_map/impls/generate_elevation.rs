use crate::tile_map::{MapParameters, Tile, TileMap, noise};

/// Seed perturbation separating the moisture field from elevation.
const MOISTURE_SEED_FLIP: u64 = 0xA076_1D64_78BD_642F;

impl TileMap {
    /// Samples the elevation and moisture fields from octave noise, then
    /// smooths elevation against each tile's neighborhood.
    pub(crate) fn generate_elevation_and_moisture(&mut self) {
        let width = self.width() as usize;
        let seed = self.map_parameters.seed;
        let settings = self.map_parameters.noise;

        for index in 0..self.tile_count() {
            let x = (index % width) as f64 * settings.frequency;
            let y = (index / width) as f64 * settings.frequency;

            self.elevation_list[index] =
                noise::octave_noise(x, y, seed, settings.octaves, settings.persistence);
            self.moisture_list[index] = noise::octave_noise(
                x,
                y,
                seed ^ MOISTURE_SEED_FLIP,
                settings.octaves,
                settings.persistence,
            );
        }

        self.elevation_list = smoothed_elevation(&self.elevation_list, &self.map_parameters);
        stretch_to_unit_range(&mut self.elevation_list);
        stretch_to_unit_range(&mut self.moisture_list);
    }
}

/// Rescales a field to span the full `[0, 1]` range. Octave sums concentrate
/// around the middle of the range, which would starve the outer elevation
/// bands of the classifier.
fn stretch_to_unit_range(field: &mut [f64]) {
    let (mut low, mut high) = (f64::MAX, f64::MIN);
    for &value in field.iter() {
        low = low.min(value);
        high = high.max(value);
    }
    let span = high - low;
    if span <= f64::EPSILON {
        return;
    }
    for value in field.iter_mut() {
        *value = (*value - low) / span;
    }
}

/// Blends each tile's elevation with its neighbors' average, 30% self and
/// 70% neighbor average, to remove high-frequency artifacts. Pure: consumes
/// a snapshot, returns a new field.
pub fn smoothed_elevation(elevation: &[f64], map_parameters: &MapParameters) -> Vec<f64> {
    elevation
        .iter()
        .enumerate()
        .map(|(index, &own)| {
            let neighbors = Tile::new(index).neighbor_tiles(map_parameters);
            if neighbors.is_empty() {
                return own;
            }
            let neighbor_average = neighbors
                .iter()
                .map(|neighbor| elevation[neighbor.index()])
                .sum::<f64>()
                / neighbors.len() as f64;
            0.3 * own + 0.7 * neighbor_average
        })
        .collect()
}
