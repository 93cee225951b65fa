//! Displayed metrics

/// The two saving metrics shown on the data screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Metric {
    /// CO2 saving in percent
    Co2,
    /// Cost saving in percent
    Cost,
}

impl Metric {
    /// All metrics in display order
    pub const ALL: [Metric; 2] = [Metric::Co2, Metric::Cost];

    /// Short label used in logs and on the loading screen
    pub const fn label(self) -> &'static str {
        match self {
            Metric::Co2 => "CO2",
            Metric::Cost => "Cost",
        }
    }

    /// Info text shown on the loading screen while this schedule loads
    pub const fn loading_text(self) -> &'static str {
        match self {
            Metric::Co2 => "Lade CO2 Daten...",
            Metric::Cost => "Lade Kostendaten...",
        }
    }
}

/// One value per metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PerMetric<T> {
    pub co2: T,
    pub cost: T,
}

impl<T> PerMetric<T> {
    pub const fn new(co2: T, cost: T) -> Self {
        Self { co2, cost }
    }

    pub fn get(&self, metric: Metric) -> &T {
        match metric {
            Metric::Co2 => &self.co2,
            Metric::Cost => &self.cost,
        }
    }

    pub fn get_mut(&mut self, metric: Metric) -> &mut T {
        match metric {
            Metric::Co2 => &mut self.co2,
            Metric::Cost => &mut self.cost,
        }
    }

    /// Both values in display order
    pub fn iter(&self) -> impl Iterator<Item = (Metric, &T)> {
        Metric::ALL.into_iter().map(move |metric| (metric, self.get(metric)))
    }
}
