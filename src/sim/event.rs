//! Track (saeta) and event containers

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Number of parameters describing a saeta
pub const NPAR: usize = 6;

/// A straight-line track: lateral origin, projected slopes, time origin and
/// slowness
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Saeta {
    pub x0: f64,
    pub xp: f64,
    pub y0: f64,
    pub yp: f64,
    pub t0: f64,
    pub s0: f64,
}

impl Saeta {
    pub fn new(x0: f64, xp: f64, y0: f64, yp: f64, t0: f64, s0: f64) -> Self {
        Self {
            x0,
            xp,
            y0,
            yp,
            t0,
            s0,
        }
    }

    /// Parameters as `[X0, XP, Y0, YP, T0, S0]`
    pub fn coords(&self) -> [f64; NPAR] {
        [self.x0, self.xp, self.y0, self.yp, self.t0, self.s0]
    }

    /// Lateral origin at the reference plane
    #[inline]
    pub fn origin(&self) -> DVec2 {
        DVec2::new(self.x0, self.y0)
    }

    /// Projected slopes (dx/dz, dy/dz)
    #[inline]
    pub fn slopes(&self) -> DVec2 {
        DVec2::new(self.xp, self.yp)
    }

    /// Lateral position after travelling `dz` below the reference plane
    #[inline]
    pub fn position_at(&self, dz: f64) -> DVec2 {
        self.origin() + self.slopes() * dz
    }
}

impl fmt::Display for Saeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X0={:10.3} XP={:8.5} Y0={:10.3} YP={:8.5} T0={:10.3} S0={:7.4}",
            self.x0, self.xp, self.y0, self.yp, self.t0, self.s0
        )
    }
}

/// One simulated event: accepted saetas in generation order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    saetas: Vec<Saeta>,
}

impl Event {
    pub fn new() -> Self {
        Self { saetas: Vec::new() }
    }

    /// Append a saeta (events are append-only)
    pub fn add_saeta(&mut self, saeta: Saeta) {
        self.saetas.push(saeta);
    }

    /// Number of saetas in the event
    pub fn multiplicity(&self) -> usize {
        self.saetas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saetas.is_empty()
    }

    pub fn saeta(&self, index: usize) -> Option<&Saeta> {
        self.saetas.get(index)
    }

    /// Parameters of the saeta at `index`
    pub fn coords(&self, index: usize) -> Option<[f64; NPAR]> {
        self.saetas.get(index).map(Saeta::coords)
    }

    pub fn saetas(&self) -> impl Iterator<Item = &Saeta> {
        self.saetas.iter()
    }

    /// Log every saeta at info level
    pub fn print_saetas(&self) {
        log::info!("Event with {} saeta(s)", self.multiplicity());
        for (i, saeta) in self.saetas.iter().enumerate() {
            log::info!("  #{i}: {saeta}");
        }
    }
}
