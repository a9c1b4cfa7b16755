use super::defines::Defines;
use super::error::ShaderError;

/// Global directives that must precede every declaration in WGSL.
const DIRECTIVES: [&str; 3] = ["enable", "requires", "diagnostic"];

/// Builds the text handed to the compiler for one stage.
///
/// Layout of the result:
/// 1. the leading comment block of `raw` is dropped (blank lines, `//` lines,
///    and `/* ... */` blocks),
/// 2. the global directives that follow it are copied unmodified,
/// 3. the rendered `defines` block,
/// 4. everything after the directives.
pub fn assemble_source(raw: &str, defines: &Defines) -> Result<String, ShaderError> {
    let block = defines.render()?;
    let lines: Vec<&str> = raw.lines().collect();

    let body_start = skip_leading_comments(&lines);
    let directives_end = body_start
        + lines[body_start..]
            .iter()
            .take_while(|l| is_directive(l))
            .count();

    let mut out = String::with_capacity(raw.len() + block.len() + 1);
    for line in &lines[body_start..directives_end] {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&block);
    for line in &lines[directives_end..] {
        out.push_str(line);
        out.push('\n');
    }
    Ok(out)
}

fn skip_leading_comments(lines: &[&str]) -> usize {
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim();
        if line.is_empty() || line.starts_with("//") {
            i += 1;
        } else if line.starts_with("/*") {
            // Consume through the line that closes the block.
            let opened_at = i;
            let closes_here = line[2..].contains("*/");
            i += 1;
            if !closes_here {
                while i < lines.len() && !lines[i].contains("*/") {
                    i += 1;
                }
                i += 1;
            }
            if i > lines.len() {
                log::warn!("unterminated block comment starting at line {}", opened_at + 1);
                return lines.len();
            }
        } else {
            break;
        }
    }
    i
}

fn is_directive(line: &str) -> bool {
    let line = line.trim_start();
    DIRECTIVES.iter().any(|d| {
        line.strip_prefix(d)
            .is_some_and(|rest| rest.starts_with(|c: char| c.is_whitespace() || c == '('))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defines() -> Defines {
        Defines::new().with("CAPACITY", 8u32)
    }

    #[test]
    fn defines_go_first_without_directives() {
        let out = assemble_source("fn f() {}\n", &defines()).unwrap();
        assert_eq!(out, "const CAPACITY = 8u;\nfn f() {}\n");
    }

    #[test]
    fn leading_line_comments_are_dropped() {
        let raw = "// header\n// more\n\nfn f() {}\n";
        let out = assemble_source(raw, &defines()).unwrap();
        assert_eq!(out, "const CAPACITY = 8u;\nfn f() {}\n");
    }

    #[test]
    fn leading_block_comment_is_dropped() {
        let raw = "/*\n * license\n */\nfn f() {}\n";
        let out = assemble_source(raw, &defines()).unwrap();
        assert_eq!(out, "const CAPACITY = 8u;\nfn f() {}\n");
    }

    #[test]
    fn single_line_block_comment() {
        let raw = "/* one */\nfn f() {}\n";
        let out = assemble_source(raw, &Defines::new()).unwrap();
        assert_eq!(out, "fn f() {}\n");
    }

    #[test]
    fn directives_kept_before_defines() {
        let raw = "// c\nenable f16;\ndiagnostic(off, derivative_uniformity);\nfn f() {}\n";
        let out = assemble_source(raw, &defines()).unwrap();
        assert_eq!(
            out,
            "enable f16;\ndiagnostic(off, derivative_uniformity);\nconst CAPACITY = 8u;\nfn f() {}\n"
        );
    }

    #[test]
    fn comments_after_body_start_are_kept() {
        let raw = "fn f() {}\n// trailing\n";
        let out = assemble_source(raw, &Defines::new()).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn identifier_starting_with_directive_word_is_body() {
        let raw = "enabled_thing();\n";
        assert!(!is_directive(raw));
        let out = assemble_source("const enabled = 1;\n", &defines()).unwrap();
        assert!(out.starts_with("const CAPACITY"));
    }

    #[test]
    fn unterminated_comment_swallows_everything() {
        let out = assemble_source("/* never closed\nfn f() {}\n", &defines()).unwrap();
        assert_eq!(out, "const CAPACITY = 8u;\n");
    }

    #[test]
    fn bad_define_propagates() {
        let d = Defines::new().flag("not valid");
        assert!(assemble_source("fn f() {}", &d).is_err());
    }
}
