use glam::IVec2;

/// One of the four platform edges the wind can blow from.
///
/// Each direction is a single lookup-table entry: a horizontal push offset
/// and a layer scan order. The dynamics step derives the diagonal push
/// (horizontal plus one step down) from the same offset, so all four
/// policies live here and nowhere else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindDirection {
    Front,
    Right,
    Back,
    Left,
}

/// Horizontal visit order for the `(x, z)` columns of one grid layer.
///
/// The named axis is the outer loop; the other axis always runs ascending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanOrder {
    XAscending,
    XDescending,
    ZAscending,
    ZDescending,
}

impl WindDirection {
    pub const ALL: [WindDirection; 4] = [
        WindDirection::Front,
        WindDirection::Right,
        WindDirection::Back,
        WindDirection::Left,
    ];

    /// Horizontal push applied to a grain, as an `(x, z)` offset.
    pub fn horizontal(self) -> IVec2 {
        match self {
            WindDirection::Front => IVec2::new(0, 1),
            WindDirection::Right => IVec2::new(1, 0),
            WindDirection::Back => IVec2::new(0, -1),
            WindDirection::Left => IVec2::new(-1, 0),
        }
    }

    /// Layer scan order used while this wind is blowing.
    ///
    /// The order is load-bearing: it decides which grain claims a contested
    /// cell first, so changing it changes simulation outcomes.
    pub fn scan_order(self) -> ScanOrder {
        match self {
            WindDirection::Front => ScanOrder::ZDescending,
            WindDirection::Right => ScanOrder::XAscending,
            WindDirection::Back => ScanOrder::ZAscending,
            WindDirection::Left => ScanOrder::XDescending,
        }
    }

    /// Display name for UI selectors.
    pub fn label(self) -> &'static str {
        match self {
            WindDirection::Front => "Front",
            WindDirection::Right => "Right",
            WindDirection::Back => "Back",
            WindDirection::Left => "Left",
        }
    }
}

/// Wind state for one simulation step.
///
/// Owned by the driver and passed by value; the dynamics engine never
/// mutates it. A disabled wind keeps its last direction so the UI selector
/// stays where the user left it.
#[derive(Clone, Copy, Debug)]
pub struct WindConfig {
    pub enabled: bool,
    pub direction: WindDirection,
}

impl WindConfig {
    /// Wind turned off.
    pub fn off() -> Self {
        Self {
            enabled: false,
            direction: WindDirection::Front,
        }
    }

    /// Wind blowing in the given direction.
    pub fn blowing(direction: WindDirection) -> Self {
        Self {
            enabled: true,
            direction,
        }
    }

    /// Scan order for this step: the direction's order while blowing,
    /// otherwise the fixed no-wind default (x ascending, z ascending).
    pub fn scan_order(self) -> ScanOrder {
        if self.enabled {
            self.direction.scan_order()
        } else {
            ScanOrder::XAscending
        }
    }
}

impl Default for WindConfig {
    fn default() -> Self {
        Self::off()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    #[test]
    fn horizontal_pushes_match_direction_names() {
        assert_eq!(WindDirection::Front.horizontal(), IVec2::new(0, 1));
        assert_eq!(WindDirection::Right.horizontal(), IVec2::new(1, 0));
        assert_eq!(WindDirection::Back.horizontal(), IVec2::new(0, -1));
        assert_eq!(WindDirection::Left.horizontal(), IVec2::new(-1, 0));
    }

    #[test]
    fn scan_order_table_is_preserved() {
        assert_eq!(WindDirection::Front.scan_order(), ScanOrder::ZDescending);
        assert_eq!(WindDirection::Right.scan_order(), ScanOrder::XAscending);
        assert_eq!(WindDirection::Back.scan_order(), ScanOrder::ZAscending);
        assert_eq!(WindDirection::Left.scan_order(), ScanOrder::XDescending);
    }

    #[test]
    fn disabled_wind_uses_default_scan_order() {
        let mut wind = WindConfig::off();
        wind.direction = WindDirection::Left;
        assert_eq!(wind.scan_order(), ScanOrder::XAscending);

        assert_eq!(
            WindConfig::blowing(WindDirection::Left).scan_order(),
            ScanOrder::XDescending
        );
    }

    #[test]
    fn every_direction_pushes_along_exactly_one_axis() {
        for dir in WindDirection::ALL {
            let push = dir.horizontal();
            assert_eq!(push.x.abs() + push.y.abs(), 1, "{dir:?}");
        }
    }
}
