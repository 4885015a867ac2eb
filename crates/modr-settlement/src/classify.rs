use std::collections::BTreeSet;

use modr_config::ContentTypeConfig;
use modr_consensus::classify;
use modr_types::{Classification, EngineError, Participant};

/// Split a flat roster into `(active, passive)` lists for [`crate::settle`].
///
/// Ineligible participants go to the passive list; settlement gives them XP
/// but no money wherever they appear.  Input order is preserved.
pub fn partition_roster(
    roster: &[Participant],
    cfg: &ContentTypeConfig,
) -> (Vec<Participant>, Vec<Participant>) {
    roster
        .iter()
        .cloned()
        .partition(|p| classify(p, cfg) == Classification::Active)
}

/// A roster entry paired with its derived class.
#[derive(Clone, Debug)]
pub(crate) struct Classified<'a> {
    pub participant: &'a Participant,
    pub class: Classification,
}

/// Classify both lists and check each entry sits in the list its class
/// says.  Ineligible entries are accepted in either list.  A wallet may
/// appear only once across both lists.
pub(crate) fn check_roster<'a>(
    active: &'a [Participant],
    passive: &'a [Participant],
    cfg: &ContentTypeConfig,
) -> Result<(Vec<Classified<'a>>, Vec<Classified<'a>>), EngineError> {
    let mut seen = BTreeSet::new();
    let mut check = |list: &'a [Participant], expected: Classification| {
        list.iter()
            .map(|p| {
                if !seen.insert(p.wallet.as_str()) {
                    return Err(EngineError::invalid_input(format!(
                        "wallet '{}' appears more than once in the roster",
                        p.wallet
                    )));
                }
                let class = classify(p, cfg);
                if class != expected && class != Classification::Ineligible {
                    return Err(EngineError::RosterMismatch {
                        wallet: p.wallet.clone(),
                        expected: expected.as_str().to_string(),
                        actual: class.as_str().to_string(),
                    });
                }
                Ok(Classified {
                    participant: p,
                    class,
                })
            })
            .collect::<Result<Vec<_>, _>>()
    };
    let active = check(active, Classification::Active)?;
    let passive = check(passive, Classification::Passive)?;
    Ok((active, passive))
}
