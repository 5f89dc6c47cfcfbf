//! Priority-ordered list of three-component channel code triplets.

use crate::loader::config::CatalogueConfig;
use crate::sensor::ComponentRole;
use crate::SeismicResult;

/// Channel codes expected for one three-component sensor, e.g. `HHZ`/`HHN`/`HHE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    codes: [String; 3],
}

impl Candidate {
    /// Code for `role`.
    pub fn code(&self, role: ComponentRole) -> &str {
        &self.codes[role_index(role)]
    }

    /// Codes in vertical, north, east order.
    pub fn codes(&self) -> &[String; 3] {
        &self.codes
    }
}

#[inline]
const fn role_index(role: ComponentRole) -> usize {
    match role {
        ComponentRole::Vertical => 0,
        ComponentRole::North => 1,
        ComponentRole::East => 2,
    }
}

/// Candidates ordered instrument, then band, then orientation convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalogue {
    candidates: Vec<Candidate>,
}

impl Catalogue {
    /// Expand a configuration into the full candidate list.
    ///
    /// # Errors
    /// Fails if the configuration does not validate.
    pub fn new(config: &CatalogueConfig) -> SeismicResult<Self> {
        config.validate()?;
        let mut candidates = Vec::with_capacity(
            config.instrument_codes.len() * config.band_codes.len() * config.triplets.len(),
        );
        for &instrument in &config.instrument_codes {
            for &band in &config.band_codes {
                for triplet in &config.triplets {
                    let code = |orientation: char| {
                        [band, instrument, orientation].into_iter().collect::<String>()
                    };
                    candidates.push(Candidate {
                        codes: [
                            code(triplet.vertical),
                            code(triplet.north),
                            code(triplet.east),
                        ],
                    });
                }
            }
        }
        Ok(Self { candidates })
    }

    /// All candidates in priority order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// First candidate whose three codes each match exactly one entry of `codes`.
    ///
    /// Returns the candidate and the indices into `codes` of its vertical, north
    /// and east channels.
    pub fn first_match<S: AsRef<str>>(&self, codes: &[S]) -> Option<(&Candidate, [usize; 3])> {
        self.candidates.iter().find_map(|candidate| {
            let mut found = [0usize; 3];
            for (slot, wanted) in found.iter_mut().zip(&candidate.codes) {
                *slot = unique_position(codes, wanted)?;
            }
            Some((candidate, found))
        })
    }
}

fn unique_position<S: AsRef<str>>(codes: &[S], wanted: &str) -> Option<usize> {
    let mut hits = codes
        .iter()
        .enumerate()
        .filter(|(_, code)| AsRef::<str>::as_ref(*code) == wanted);
    let (index, _) = hits.next()?;
    hits.next().is_none().then_some(index)
}
