//! Hand-rolled flag parsing: `--flag value` pairs and bare positionals.

use std::str::FromStr;

/// Value following `flag`, if present.
pub fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

/// Parsed value following `flag`, or `default` when missing or unparsable.
pub fn parse_arg<T: FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    arg_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Arguments that are neither flags nor the value of a flag in `valued`.
pub fn positional_args<'a>(args: &'a [String], valued: &[&str]) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
        } else if valued.contains(&arg.as_str()) {
            skip_next = true;
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

/// `--threads`, defaulting to `available`. Zero runs on one worker.
pub fn thread_count(args: &[String], available: usize) -> usize {
    parse_arg(args, "--threads", available).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flag_values_parse_with_fallback() {
        let a = args(&["sir-sim", "--seed", "7", "--days", "many"]);
        assert_eq!(arg_value(&a, "--seed"), Some("7"));
        assert_eq!(parse_arg(&a, "--seed", 42u64), 7);
        assert_eq!(parse_arg(&a, "--days", 365u64), 365);
        assert_eq!(arg_value(&a, "--output"), None);
    }

    #[test]
    fn positionals_skip_flag_values() {
        let a = args(&["seq.csv", "--report", "out.txt", "par.csv", "--quiet"]);
        assert_eq!(positional_args(&a, &["--report"]), vec!["seq.csv", "par.csv"]);
    }

    #[test]
    fn zero_threads_means_one_worker() {
        assert_eq!(thread_count(&args(&["--threads", "0"]), 8), 1);
        assert_eq!(thread_count(&args(&["--threads", "3"]), 8), 3);
        assert_eq!(thread_count(&args(&[]), 8), 8);
    }
}
