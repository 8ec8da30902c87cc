use serde::{Deserialize, Serialize};
use std::fmt;

/// The three record collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Hotel,
    Flight,
    Experience,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Hotel, Domain::Experience, Domain::Flight];

    /// Value of the `type` metadata key for documents of this domain
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Hotel => "hotel",
            Domain::Flight => "flight",
            Domain::Experience => "experience",
        }
    }

    /// Collection name, also its directory under the data root
    pub fn collection_name(&self) -> &'static str {
        match self {
            Domain::Hotel => "hotels",
            Domain::Flight => "flights",
            Domain::Experience => "experiences",
        }
    }

    pub(crate) fn plural(&self) -> &'static str {
        self.collection_name()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
