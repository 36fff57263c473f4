use crate::names::NamingFamily;
use strum::{EnumIter, EnumString, IntoStaticStr};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, IntoStaticStr, EnumIter, EnumString,
)]
pub enum Product {
    #[strum(serialize = "mag-l1b-geof")]
    MagL1bGeof,
    #[strum(serialize = "seis-l1b-ehis")]
    SeisL1bEhis,
    #[strum(serialize = "seis-l1b-mpsh")]
    SeisL1bMpsh,
    #[strum(serialize = "seis-l1b-mpsl")]
    SeisL1bMpsl,
    #[strum(serialize = "seis-l1b-sgps")]
    SeisL1bSgps,
    #[strum(serialize = "suvi-l1b-fe094")]
    SuviL1bFe094,
    #[strum(serialize = "suvi-l1b-fe131")]
    SuviL1bFe131,
    #[strum(serialize = "suvi-l1b-fe171")]
    SuviL1bFe171,
    #[strum(serialize = "suvi-l1b-fe195")]
    SuviL1bFe195,
    #[strum(serialize = "suvi-l1b-fe284")]
    SuviL1bFe284,
    #[strum(serialize = "suvi-l1b-he304")]
    SuviL1bHe304,
    #[strum(serialize = "magn-l2-avg1m")]
    MagnL2Avg1m,
    #[strum(serialize = "magn-l2-hires")]
    MagnL2Hires,
    #[strum(serialize = "mpsh-l2-avg1m")]
    MpshL2Avg1m,
    #[strum(serialize = "mpsh-l2-avg5m")]
    MpshL2Avg5m,
    #[strum(serialize = "suvi-l2-ci094")]
    SuviL2Ci094,
    #[strum(serialize = "suvi-l2-ci131")]
    SuviL2Ci131,
    #[strum(serialize = "suvi-l2-ci171")]
    SuviL2Ci171,
    #[strum(serialize = "suvi-l2-ci195")]
    SuviL2Ci195,
    #[strum(serialize = "suvi-l2-ci284")]
    SuviL2Ci284,
    #[strum(serialize = "suvi-l2-ci304")]
    SuviL2Ci304,
    #[strum(serialize = "suvi-l2-thmap")]
    SuviL2Thmap,
}

impl Product {
    /// Dashed product id used in listing page paths, e.g. `suvi-l2-ci094`.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// The processing level path segment, the second token of the dashed name.
    pub fn level(self) -> &'static str {
        use Product::*;

        match self {
            MagL1bGeof | SeisL1bEhis | SeisL1bMpsh | SeisL1bMpsl | SeisL1bSgps | SuviL1bFe094
            | SuviL1bFe131 | SuviL1bFe171 | SuviL1bFe195 | SuviL1bFe284 | SuviL1bHe304 => "l1b",
            MagnL2Avg1m | MagnL2Hires | MpshL2Avg1m | MpshL2Avg5m | SuviL2Ci094 | SuviL2Ci131
            | SuviL2Ci171 | SuviL2Ci195 | SuviL2Ci284 | SuviL2Ci304 | SuviL2Thmap => "l2",
        }
    }

    pub fn family(self) -> Option<NamingFamily> {
        use Product::*;

        match self {
            SuviL2Ci094 | SuviL2Ci131 | SuviL2Ci171 | SuviL2Ci195 | SuviL2Ci284 | SuviL2Ci304 => {
                Some(NamingFamily::CompositeImage)
            }
            SuviL1bFe094 | SuviL1bFe131 | SuviL1bFe171 | SuviL1bFe195 | SuviL1bFe284
            | SuviL1bHe304 => Some(NamingFamily::L1bRadiance),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn level_is_second_token_of_name() {
        for prod in Product::iter() {
            let second = prod.name().split('-').nth(1).unwrap();
            assert_eq!(prod.level(), second, "{:?}", prod);
        }
    }

    #[test]
    fn names_are_dashed_lowercase_and_parse_back() {
        assert_eq!(Product::iter().count(), 22);
        for prod in Product::iter() {
            let name = prod.name();
            assert!(!name.contains('_'));
            assert_eq!(name, name.to_lowercase());
            assert_eq!(name.parse::<Product>().unwrap(), prod);
        }
    }

    #[test]
    fn families() {
        assert_eq!(Product::SuviL2Ci304.family(), Some(NamingFamily::CompositeImage));
        assert_eq!(Product::SuviL1bHe304.family(), Some(NamingFamily::L1bRadiance));
        assert_eq!(Product::SuviL2Thmap.family(), None);
        assert_eq!(Product::MagL1bGeof.family(), None);

        let composites = Product::iter()
            .filter(|p| p.family() == Some(NamingFamily::CompositeImage))
            .count();
        assert_eq!(composites, 6);
    }
}
