/// Long flags that never take a value.
const SWITCHES: [&str; 2] = ["help", "version"];

/// Rewrite Go-style single dash long flags (`-queue=q`, `-uri x`) into the
/// double dash form clap understands.
///
/// Short flags such as `-h`, anything after a `--` terminator, and the value
/// following a flag written without `=` are passed through untouched.
pub fn go_style_flags<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut terminated = false;
    let mut value_pending = false;
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            // argv[0] is the program name
            if i == 0 || terminated {
                return arg;
            }
            if value_pending {
                value_pending = false;
                return arg;
            }
            if arg == "--" {
                terminated = true;
                return arg;
            }
            let name = match arg.strip_prefix("--").or_else(|| arg.strip_prefix('-')) {
                Some(name) if name.len() > 1 => name,
                _ => return arg,
            };
            value_pending = !name.contains('=') && !SWITCHES.contains(&name);
            format!("--{name}")
        })
        .collect()
}

/// Strip the line terminator left behind by a `\n` split, including a `\r`
/// preceding it.
pub fn trim_line_ending(mut line: &[u8]) -> &[u8] {
    if let Some(rest) = line.strip_suffix(b"\n") {
        line = rest;
    }
    if let Some(rest) = line.strip_suffix(b"\r") {
        line = rest;
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_dash_long_flags_are_doubled() {
        let out = go_style_flags(args(&[
            "spaceballz",
            "-action=blow",
            "-uri",
            "amqp://localhost",
            "--queue=q",
            "lines.txt",
        ]));
        assert_eq!(
            out,
            args(&[
                "spaceballz",
                "--action=blow",
                "--uri",
                "amqp://localhost",
                "--queue=q",
                "lines.txt",
            ])
        );
    }

    #[test]
    fn test_short_flags_and_terminator_untouched() {
        let out = go_style_flags(args(&["spaceballz", "-h", "--", "-weird-file"]));
        assert_eq!(out, args(&["spaceballz", "-h", "--", "-weird-file"]));
    }

    #[test]
    fn test_dash_prefixed_value_is_not_a_flag() {
        let out = go_style_flags(args(&[
            "spaceballz",
            "-action=suck",
            "-queue",
            "-dlq",
            "--uri",
            "-amqp",
        ]));
        assert_eq!(
            out,
            args(&[
                "spaceballz",
                "--action=suck",
                "--queue",
                "-dlq",
                "--uri",
                "-amqp",
            ])
        );
    }

    #[test]
    fn test_switches_do_not_swallow_the_next_argument() {
        let out = go_style_flags(args(&["spaceballz", "-help", "-action=blow"]));
        assert_eq!(out, args(&["spaceballz", "--help", "--action=blow"]));
    }

    #[test]
    fn test_trim_line_ending() {
        assert_eq!(trim_line_ending(b"a\n"), b"a");
        assert_eq!(trim_line_ending(b"a\r\n"), b"a");
        assert_eq!(trim_line_ending(b"a"), b"a");
        assert_eq!(trim_line_ending(b"\n"), b"");
        assert_eq!(trim_line_ending(b"a\rb\n"), b"a\rb");
    }
}
