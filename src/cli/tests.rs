#[cfg(test)]
mod cli_tests {
    use crate::cli::parser::*;
    use clap::Parser;

    #[test]
    fn test_no_arguments_is_report_mode() {
        let cli = Cli::try_parse_from(["branch-sweep"]).unwrap();
        assert!(!cli.delete);
        assert!(!cli.interactive);
        assert!(!cli.merged_only);
        assert_eq!(cli.confirm, ConfirmMode::Countdown);
        assert_eq!(cli.verbose, 0);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_delete_flag() {
        let cli = Cli::try_parse_from(["branch-sweep", "--delete", "--confirm", "prompt"]).unwrap();
        assert!(cli.delete);
        assert_eq!(cli.confirm, ConfirmMode::Prompt);
    }

    #[test]
    fn test_delete_with_options() {
        let cli = Cli::try_parse_from([
            "branch-sweep",
            "--delete",
            "--merged-only",
            "--delete-local",
            "--countdown-secs",
            "5",
            "--repo",
            "/srv/repo",
            "-vv",
        ])
        .unwrap();

        assert!(cli.merged_only);
        assert!(cli.delete_local);
        assert_eq!(cli.countdown_secs, Some(5));
        assert_eq!(cli.repo.as_deref(), Some(std::path::Path::new("/srv/repo")));
        assert_eq!(cli.verbose, 2);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_interactive_conflicts_with_delete() {
        assert!(Cli::try_parse_from(["branch-sweep", "--interactive", "--delete"]).is_err());
        assert!(Cli::try_parse_from(["branch-sweep", "-i", "--merged-only"]).is_err());
        assert!(Cli::try_parse_from(["branch-sweep", "-i"]).is_ok());
    }

    #[test]
    fn test_json_conflicts_with_delete() {
        assert!(Cli::try_parse_from(["branch-sweep", "--json", "--delete"]).is_err());
        assert!(Cli::try_parse_from(["branch-sweep", "--json"]).is_ok());
    }

    #[test]
    fn test_delete_local_requires_deletion() {
        let cli = Cli::try_parse_from(["branch-sweep", "--delete-local"]).unwrap();
        assert!(cli.validate().is_err());

        let cli = Cli::try_parse_from(["branch-sweep", "-i", "--delete-local"]).unwrap();
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_zero_countdown_rejected() {
        let cli =
            Cli::try_parse_from(["branch-sweep", "--delete", "--countdown-secs", "0"]).unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_invalid_confirm_mode() {
        assert!(Cli::try_parse_from(["branch-sweep", "--confirm", "maybe"]).is_err());
    }

    #[test]
    fn test_completions_shell() {
        let cli = Cli::try_parse_from(["branch-sweep", "--completions", "bash"]).unwrap();
        assert_eq!(cli.completions, Some(clap_complete::Shell::Bash));
    }
}
