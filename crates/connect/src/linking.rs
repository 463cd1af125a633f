//! Account linking: candidate computation and link-map merging.
//!
//! Prompt mechanics stay behind the [`AccountSelector`] capability so a
//! linking pass is a deterministic function of its inputs and the
//! selections returned, testable without a terminal.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::models::RemoteAccount;
use ledgerbridge_core::ledger::{LedgerAccount, LinkMap};
use ledgerbridge_core::Result;

/// One selectable entry when linking a remote account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Display name shown to the user.
    pub name: String,
    /// Ledger account id, or `None` for the terminal Skip entry.
    pub value: Option<String>,
}

/// Capability for soliciting one link selection from the user.
#[async_trait]
pub trait AccountSelector: Send + Sync {
    /// Ask which of `choices` the given remote account should link to.
    ///
    /// `default` is the previously linked ledger account id, if any.
    /// Returns the chosen ledger account id, or `None` for Skip.
    async fn select(
        &self,
        remote: &RemoteAccount,
        choices: &[Choice],
        default: Option<&str>,
    ) -> Result<Option<String>>;
}

/// Compute the candidate list for one remote account.
///
/// Ledger accounts already claimed earlier in the same pass are excluded,
/// the rest are sorted ascending by case-insensitive name, and a terminal
/// Skip entry is appended.
pub fn candidate_choices(
    ledger_accounts: &[LedgerAccount],
    already_chosen: &HashSet<String>,
) -> Vec<Choice> {
    let mut choices: Vec<Choice> = ledger_accounts
        .iter()
        .filter(|a| !already_chosen.contains(&a.id))
        .map(|a| Choice {
            name: a.name.clone(),
            value: Some(a.id.clone()),
        })
        .collect();
    choices.sort_by(|a, b| a.name.to_uppercase().cmp(&b.name.to_uppercase()));
    choices.push(Choice {
        name: "Skip".to_string(),
        value: None,
    });
    choices
}

/// Run one linking pass and merge the selections into the prior link map.
///
/// Remote accounts that already carry a link are left alone unless
/// `force_relink` is set. Within the pass each ledger account can be
/// claimed once, in remote-account enumeration order (first claimed
/// wins). An explicit Skip selection removes any prior entry; accounts
/// auto-skipped because only the Skip choice remained keep theirs.
/// The returned map never contains null-valued entries.
pub async fn link_pass(
    remote_accounts: &[RemoteAccount],
    ledger_accounts: &[LedgerAccount],
    prior_links: &LinkMap,
    force_relink: bool,
    selector: &dyn AccountSelector,
) -> Result<LinkMap> {
    let mut links = prior_links.clone();
    let mut chosen: HashSet<String> = HashSet::new();

    for remote in remote_accounts {
        if !force_relink && prior_links.contains_key(&remote.id) {
            continue;
        }

        let choices = candidate_choices(ledger_accounts, &chosen);
        if choices.len() <= 1 {
            // Only Skip is left; nothing to offer, any prior entry survives.
            log::debug!("No linkable ledger accounts left for '{}'", remote.name);
            continue;
        }

        let default = prior_links.get(&remote.id).map(String::as_str);
        match selector.select(remote, &choices, default).await? {
            Some(ledger_id) => {
                chosen.insert(ledger_id.clone());
                links.insert(remote.id.clone(), ledger_id);
            }
            None => {
                links.remove(&remote.id);
            }
        }
    }

    Ok(links)
}
