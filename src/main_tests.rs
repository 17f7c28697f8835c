    use super::cli::Cli;
    use super::cli::args::CodecArg;
    use ccount::cache::Codec;
    use clap::Parser;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ccount").chain(args.iter().copied())).unwrap()
    }

    // ─── Defaults ────────────────────────────────────────

    #[test]
    fn test_defaults() {
        let cli = parse(&["repo"]);
        assert_eq!(cli.repo, PathBuf::from("repo"));
        assert_eq!(cli.limit, 50);
        assert_eq!(cli.codec, CodecArg::Gzip);
        assert_eq!(cli.output, PathBuf::from("ccount.html"));

        let opts = cli.run_options();
        assert!(opts.collapse);
        assert!(opts.use_cache);
        assert_eq!(opts.revision, None);
        assert_eq!(opts.languages, vec!["Python", "TypeScript", "Sass"]);
        assert_eq!(opts.codec, Codec::Gzip { level: 9 });
        assert_eq!(opts.counter.to_string(), "tokei --output json");
    }

    #[test]
    fn test_repo_is_required() {
        assert!(Cli::try_parse_from(["ccount"]).is_err());
    }

    // ─── Limit validation ────────────────────────────────

    #[test]
    fn test_limit_one_is_rejected() {
        assert!(Cli::try_parse_from(["ccount", "repo", "-n", "1"]).is_err());
    }

    #[test]
    fn test_limit_zero_and_two_are_accepted() {
        assert_eq!(parse(&["repo", "--limit", "0"]).limit, 0);
        assert_eq!(parse(&["repo", "-n", "2"]).limit, 2);
    }

    #[test]
    fn test_limit_must_be_numeric() {
        assert!(Cli::try_parse_from(["ccount", "repo", "-n", "many"]).is_err());
    }

    // ─── Options mapping ─────────────────────────────────

    #[test]
    fn test_languages_are_split_and_trimmed() {
        let opts = parse(&["repo", "-l", "Rust, Python,,TOML"]).run_options();
        assert_eq!(opts.languages, vec!["Rust", "Python", "TOML"]);
    }

    #[test]
    fn test_flags_map_to_run_options() {
        let opts = parse(&[
            "repo",
            "-b",
            "develop",
            "--no-collapse",
            "--no-cache",
            "--cache-dir",
            "/tmp/ccount-cache",
            "--counter",
            "scc --format json",
        ])
        .run_options();
        assert_eq!(opts.revision.as_deref(), Some("develop"));
        assert!(!opts.collapse);
        assert!(!opts.use_cache);
        assert_eq!(opts.cache_root, PathBuf::from("/tmp/ccount-cache"));
        assert_eq!(opts.counter.program, "scc");
        assert_eq!(opts.counter.args, vec!["--format", "json"]);
    }

    #[test]
    fn test_codec_selection() {
        assert_eq!(parse(&["repo", "--codec", "identity"]).codec(), Codec::Identity);
        assert_eq!(parse(&["repo", "--codec", "lz4"]).codec(), Codec::Lz4);
        assert_eq!(parse(&["repo", "--gzip-level", "3"]).codec(), Codec::Gzip { level: 3 });
        assert!(Cli::try_parse_from(["ccount", "repo", "--gzip-level", "12"]).is_err());
        assert!(Cli::try_parse_from(["ccount", "repo", "--codec", "zstd"]).is_err());
    }

    #[test]
    fn test_empty_counter_is_rejected() {
        assert!(Cli::try_parse_from(["ccount", "repo", "--counter", "  "]).is_err());
    }

    #[test]
    fn test_counter_with_quoted_argument() {
        let opts = parse(&["repo", "--counter", "tokei --exclude 'vendor dir' --output json"]).run_options();
        assert_eq!(opts.counter.args, vec!["--exclude", "vendor dir", "--output", "json"]);
    }

    #[test]
    fn test_counter_with_unbalanced_quote_is_rejected() {
        let err = Cli::try_parse_from(["ccount", "repo", "--counter", "tokei --exclude 'vendor"]).unwrap_err();
        assert!(err.to_string().contains("cannot parse counter command"), "{}", err);
    }

    // ─── Logging ─────────────────────────────────────────

    #[test]
    fn test_log_level() {
        assert_eq!(parse(&["repo"]).max_log_level(), tracing::Level::INFO);
        assert_eq!(parse(&["repo", "--log-level", "warn"]).max_log_level(), tracing::Level::WARN);
        assert_eq!(parse(&["repo", "-v"]).max_log_level(), tracing::Level::DEBUG);
        assert_eq!(parse(&["repo", "-v", "--log-level", "error"]).max_log_level(), tracing::Level::DEBUG);
    }
