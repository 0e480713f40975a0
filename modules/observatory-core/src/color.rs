use serde::Serialize;

/// Choropleth fill band for a country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillBand {
    Band0,
    Band1,
    Band2,
    Band3,
    Band4,
    /// Country outside the tracked list.
    Untracked,
}

impl FillBand {
    /// Band for a tracked country's count. First matching threshold wins.
    pub fn for_count(count: usize) -> Self {
        match count {
            0 => FillBand::Band0,
            1..=10 => FillBand::Band1,
            11..=20 => FillBand::Band2,
            21..=40 => FillBand::Band3,
            _ => FillBand::Band4,
        }
    }

    pub fn for_country(count: usize, tracked: bool) -> Self {
        if tracked {
            Self::for_count(count)
        } else {
            FillBand::Untracked
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            FillBand::Band0 => "#dfdfdf",
            FillBand::Band1 => "#dee2e1",
            FillBand::Band2 => "#bfd4d3",
            FillBand::Band3 => "#80aaa8",
            FillBand::Band4 => "#3c7a77",
            FillBand::Untracked => "#e3e7e5",
        }
    }

    /// 0-4 for tracked bands, `None` for untracked.
    pub fn level(&self) -> Option<u8> {
        match self {
            FillBand::Band0 => Some(0),
            FillBand::Band1 => Some(1),
            FillBand::Band2 => Some(2),
            FillBand::Band3 => Some(3),
            FillBand::Band4 => Some(4),
            FillBand::Untracked => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(FillBand::for_count(0), FillBand::Band0);
        assert_eq!(FillBand::for_count(1), FillBand::Band1);
        assert_eq!(FillBand::for_count(10), FillBand::Band1);
        assert_eq!(FillBand::for_count(11), FillBand::Band2);
        assert_eq!(FillBand::for_count(20), FillBand::Band2);
        assert_eq!(FillBand::for_count(21), FillBand::Band3);
        assert_eq!(FillBand::for_count(40), FillBand::Band3);
        assert_eq!(FillBand::for_count(41), FillBand::Band4);
        assert_eq!(FillBand::for_count(500), FillBand::Band4);
    }

    #[test]
    fn untracked_ignores_count() {
        for count in [0, 1, 15, 41] {
            let band = FillBand::for_country(count, false);
            assert_eq!(band, FillBand::Untracked);
            assert_eq!(band.level(), None);
        }
    }

    #[test]
    fn bands_have_distinct_fills() {
        let fills: std::collections::HashSet<_> = [
            FillBand::Band0,
            FillBand::Band1,
            FillBand::Band2,
            FillBand::Band3,
            FillBand::Band4,
            FillBand::Untracked,
        ]
        .iter()
        .map(FillBand::hex)
        .collect();
        assert_eq!(fills.len(), 6);
    }
}
