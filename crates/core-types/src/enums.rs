use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which slice of a user's holdings a snapshot describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortfolioType {
    Crypto,
    #[serde(alias = "stock")]
    Stocks,
    #[default]
    Combined,
}

impl PortfolioType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortfolioType::Crypto => "crypto",
            PortfolioType::Stocks => "stocks",
            PortfolioType::Combined => "combined",
        }
    }
}

impl fmt::Display for PortfolioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortfolioType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crypto" => Ok(PortfolioType::Crypto),
            "stocks" | "stock" => Ok(PortfolioType::Stocks),
            "combined" => Ok(PortfolioType::Combined),
            other => Err(CoreError::UnknownPortfolioType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_singular_and_plural_stock_names() {
        assert_eq!("stock".parse::<PortfolioType>(), Ok(PortfolioType::Stocks));
        assert_eq!(" Stocks ".parse::<PortfolioType>(), Ok(PortfolioType::Stocks));
        assert!("bonds".parse::<PortfolioType>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&PortfolioType::Combined).unwrap();
        assert_eq!(json, "\"combined\"");
        let parsed: PortfolioType = serde_json::from_str("\"stock\"").unwrap();
        assert_eq!(parsed, PortfolioType::Stocks);
    }
}
