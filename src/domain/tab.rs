use std::fmt;
use std::str::FromStr;

/// The three mutually exclusive dashboard views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tab {
    #[default]
    Profile,
    Listings,
    Customers,
}

impl Tab {
    /// Whether showing this tab needs the owned listings.
    #[must_use]
    pub const fn needs_listings(self) -> bool {
        matches!(self, Self::Listings | Self::Customers)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Listings => "listings",
            Self::Customers => "customers",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "profile" => Ok(Self::Profile),
            "listings" => Ok(Self::Listings),
            "customers" => Ok(Self::Customers),
            other => Err(format!("unknown tab '{other}'")),
        }
    }
}
