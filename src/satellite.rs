use strum::{EnumIter, EnumString, IntoStaticStr};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, IntoStaticStr, EnumIter, EnumString,
)]
pub enum Satellite {
    #[strum(serialize = "goes16")]
    GOES16,
    #[strum(serialize = "goes17")]
    GOES17,
}

impl Satellite {
    /// Lowercase platform id as it appears in listing page paths.
    pub fn id(self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn ids_are_lowercase_and_parse_back() {
        for sat in Satellite::iter() {
            let id = sat.id();
            assert_eq!(id, id.to_lowercase());
            assert_eq!(id.parse::<Satellite>().unwrap(), sat);
        }
        assert_eq!(Satellite::GOES16.id(), "goes16");
        assert_eq!(Satellite::GOES17.id(), "goes17");
    }
}
