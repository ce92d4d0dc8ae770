//! Immutable windfarm topology.
//!
//! The layout is strings of turbines (and their array cables) rooted at
//! substations. The simulation consumes it read-only: the only query the
//! engine needs is capacity-weighted downtime, which the downtime-threshold
//! dispatch strategy evaluates at every check.

use crate::sim::asset::Asset;

/// Static substation-rooted topology over the engine's asset vector.
#[derive(Debug, Clone)]
pub struct WindFarm {
    /// For each asset index, the index of the substation rooting its string.
    /// Substations map to themselves.
    substation_of: Vec<usize>,
    total_capacity_kw: f64,
}

impl WindFarm {
    /// Builds the topology. `substation_of[i]` must already be resolved to a
    /// valid asset index; configuration validation guarantees it.
    pub fn new(assets: &[Asset], substation_of: Vec<usize>) -> Self {
        let total_capacity_kw = assets.iter().map(|a| a.capacity_kw).sum();
        Self {
            substation_of,
            total_capacity_kw,
        }
    }

    /// Sum of rated capacities in kW.
    pub fn total_capacity_kw(&self) -> f64 {
        self.total_capacity_kw
    }

    /// Substation rooting the given asset's string.
    pub fn substation_of(&self, asset: usize) -> usize {
        self.substation_of[asset]
    }

    /// Capacity-weighted downtime fraction in [0, 1].
    ///
    /// A turbine or cable delivers through its substation, so its effective
    /// output is capped by the substation's own operating level.
    pub fn weighted_downtime(&self, assets: &[Asset]) -> f64 {
        if self.total_capacity_kw <= 0.0 {
            return 0.0;
        }
        let mut produced = 0.0;
        for (i, asset) in assets.iter().enumerate() {
            let station = self.substation_of[i];
            let station_level = if station == i {
                1.0
            } else {
                assets[station].operating_level()
            };
            produced += asset.capacity_kw * asset.operating_level() * station_level;
        }
        (1.0 - produced / self.total_capacity_kw).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::sim::asset::AssetKind;

    use super::*;

    fn farm() -> (Vec<Asset>, WindFarm) {
        let assets = vec![
            Asset::new("OSS1".to_string(), AssetKind::Substation, 0.0, Vec::new()),
            Asset::new("S00T1".to_string(), AssetKind::Turbine, 3000.0, Vec::new()),
            Asset::new("S00T2".to_string(), AssetKind::Turbine, 3000.0, Vec::new()),
        ];
        let farm = WindFarm::new(&assets, vec![0, 0, 0]);
        (assets, farm)
    }

    #[test]
    fn healthy_farm_has_zero_downtime() {
        let (assets, farm) = farm();
        assert_eq!(farm.total_capacity_kw(), 6000.0);
        assert_eq!(farm.weighted_downtime(&assets), 0.0);
    }

    #[test]
    fn downtime_is_capacity_weighted() {
        let (mut assets, farm) = farm();
        assets[1].set_under_tow(true);
        assets[1].recompute_operating_level();
        assert!((farm.weighted_downtime(&assets) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn substation_outage_caps_its_string() {
        let (mut assets, farm) = farm();
        assets[0].set_under_tow(true);
        assets[0].recompute_operating_level();
        // Both turbines deliver through the dead substation.
        assert_eq!(farm.weighted_downtime(&assets), 1.0);
    }

    #[test]
    fn empty_farm_reports_no_downtime() {
        let farm = WindFarm::new(&[], Vec::new());
        assert_eq!(farm.weighted_downtime(&[]), 0.0);
    }
}
