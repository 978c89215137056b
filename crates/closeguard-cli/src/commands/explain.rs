use anyhow::{Result, bail};
use closeguard_core::services::WindowCensus;
use closeguard_core::{
    CloseConfirmation, CloseDecision, ClosePolicy, DownloadBlock, DownloadCloseType,
    MultiTabDecision, ProfileKind,
};
use serde::Serialize;

/// The browser state to evaluate a close against
#[derive(Debug, Clone)]
pub struct ExplainInput {
    /// In-progress downloads across all profiles
    pub downloads: usize,
    /// In-progress downloads of the closing window's profile
    pub profile_downloads: usize,
    pub other_windows: usize,
    pub same_profile_windows: usize,
    pub profile_kind: ProfileKind,
    pub tabs: usize,
    pub close_confirmation: CloseConfirmation,
    pub profile_manager: bool,
    pub browser_outlives_windows: bool,
}

/// What would happen on a fresh close attempt
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub decision: CloseDecision,
    /// The prompt shown first, if any
    pub first_prompt: Option<ClosePolicy>,
    pub downloads: DownloadBlock,
    pub multi_tab: MultiTabDecision,
    /// An empty window gets a new-tab page before the confirmation shows
    pub placeholder_tab: bool,
}

/// Evaluate both close warnings for `input` without any side effects
pub fn explain(input: &ExplainInput) -> Result<Explanation> {
    if input.profile_downloads > input.downloads {
        bail!(
            "--profile-downloads ({}) cannot exceed --downloads ({})",
            input.profile_downloads,
            input.downloads
        );
    }
    if input.same_profile_windows > input.other_windows {
        bail!(
            "--same-profile-windows ({}) cannot exceed --other-windows ({})",
            input.same_profile_windows,
            input.other_windows
        );
    }

    let census = WindowCensus {
        others: input.other_windows,
        same_profile: input.same_profile_windows,
    };

    let survives =
        DownloadBlock::survives_close(input.browser_outlives_windows, input.profile_kind);
    let downloads = if !input.profile_manager || survives {
        DownloadBlock::OK
    } else {
        DownloadBlock::evaluate(
            input.downloads,
            input.profile_downloads,
            census,
            input.profile_kind,
        )
    };

    let multi_tab = if input.profile_manager {
        MultiTabDecision::evaluate(input.close_confirmation, input.other_windows, input.tabs)
    } else {
        MultiTabDecision::Ok
    };

    let first_prompt = if !downloads.is_ok() {
        Some(ClosePolicy::Downloads)
    } else if multi_tab == MultiTabDecision::NeedsPrompt {
        Some(ClosePolicy::MultipleTabs)
    } else {
        None
    };

    Ok(Explanation {
        decision: if first_prompt.is_some() {
            CloseDecision::DoNotClose
        } else {
            CloseDecision::OkToClose
        },
        first_prompt,
        downloads,
        multi_tab,
        // The confirmation is only reached when downloads let the close through
        placeholder_tab: first_prompt == Some(ClosePolicy::MultipleTabs) && input.tabs == 0,
    })
}

pub fn execute(input: &ExplainInput, format: &str) -> Result<()> {
    tracing::debug!("Explaining close for {:?}", input);

    let explanation = explain(input)?;

    match format {
        "json" => output_json(&explanation)?,
        _ => output_pretty(&explanation)?,
    }

    Ok(())
}

fn output_pretty(explanation: &Explanation) -> Result<()> {
    use console::style;

    println!("\n{}", style("Close Decision").bold().cyan());
    println!("{}", style("==============").cyan());

    let downloads = match explanation.downloads.close_type {
        DownloadCloseType::Ok => "ok".to_string(),
        DownloadCloseType::BrowserShutdownWouldCancel => format!(
            "browser shutdown would cancel {} download(s)",
            explanation.downloads.blocking
        ),
        DownloadCloseType::LastWindowForOffTheRecordProfile(kind) => format!(
            "last {} window would cancel {} download(s)",
            kind, explanation.downloads.blocking
        ),
    };
    let multi_tab = match explanation.multi_tab {
        MultiTabDecision::Ok => "ok",
        MultiTabDecision::NeedsPrompt => "needs confirmation",
    };

    println!("\n{}", style("Checks:").bold());
    println!("  Downloads:          {}", downloads);
    println!("  Close Confirmation: {}", multi_tab);
    if explanation.placeholder_tab {
        println!("  Placeholder Tab:    added before asking");
    }

    println!("\n{}", style("Result:").bold());
    match explanation.first_prompt {
        None => println!("  {}", style("OK to close").green()),
        Some(policy) => println!(
            "  {} (shows the {} prompt first)",
            style("Do not close yet").yellow(),
            policy
        ),
    }

    println!();
    Ok(())
}

fn output_json(explanation: &Explanation) -> Result<()> {
    let json = serde_json::to_string_pretty(explanation)?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ExplainInput {
        ExplainInput {
            downloads: 0,
            profile_downloads: 0,
            other_windows: 0,
            same_profile_windows: 0,
            profile_kind: ProfileKind::Regular,
            tabs: 1,
            close_confirmation: CloseConfirmation::Disabled,
            profile_manager: true,
            browser_outlives_windows: false,
        }
    }

    #[test]
    fn test_nothing_to_warn_about() {
        let explanation = explain(&input()).unwrap();
        assert_eq!(explanation.decision, CloseDecision::OkToClose);
        assert_eq!(explanation.first_prompt, None);
    }

    #[test]
    fn test_downloads_are_checked_first() {
        let explanation = explain(&ExplainInput {
            downloads: 2,
            profile_downloads: 2,
            tabs: 3,
            close_confirmation: CloseConfirmation::LastWindow,
            ..input()
        })
        .unwrap();

        assert_eq!(explanation.first_prompt, Some(ClosePolicy::Downloads));
        assert_eq!(explanation.multi_tab, MultiTabDecision::NeedsPrompt);
        assert_eq!(explanation.downloads.blocking, 2);
    }

    #[test]
    fn test_placeholder_for_empty_window() {
        let explanation = explain(&ExplainInput {
            other_windows: 1,
            same_profile_windows: 1,
            tabs: 0,
            close_confirmation: CloseConfirmation::OtherWindowsOpen,
            ..input()
        })
        .unwrap();

        assert_eq!(explanation.first_prompt, Some(ClosePolicy::MultipleTabs));
        assert!(explanation.placeholder_tab);
    }

    #[test]
    fn test_no_placeholder_while_downloads_warn_first() {
        let explanation = explain(&ExplainInput {
            downloads: 1,
            profile_downloads: 1,
            tabs: 0,
            close_confirmation: CloseConfirmation::OtherWindowsOpen,
            other_windows: 1,
            same_profile_windows: 0,
            profile_kind: ProfileKind::Incognito,
            ..input()
        })
        .unwrap();

        assert_eq!(explanation.first_prompt, Some(ClosePolicy::Downloads));
        assert_eq!(explanation.multi_tab, MultiTabDecision::NeedsPrompt);
        assert!(!explanation.placeholder_tab);
    }

    #[test]
    fn test_browser_outliving_windows_spares_regular_downloads() {
        let explanation = explain(&ExplainInput {
            downloads: 1,
            profile_downloads: 1,
            browser_outlives_windows: true,
            ..input()
        })
        .unwrap();
        assert!(explanation.downloads.is_ok());
    }

    #[test]
    fn test_rejects_inconsistent_counts() {
        let err = explain(&ExplainInput {
            downloads: 1,
            profile_downloads: 2,
            ..input()
        })
        .unwrap_err();
        assert!(err.to_string().contains("--profile-downloads"));
    }
}
