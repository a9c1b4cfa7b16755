use std::collections::BTreeMap;
use std::fmt::Write as _;

use super::error::ShaderError;

/// Value of one compile-time constant.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DefineValue {
    /// Presence flag; rendered as `true`.
    Flag,
    Bool(bool),
    U32(u32),
    I32(i32),
    F32(f32),
}

impl From<bool> for DefineValue {
    fn from(v: bool) -> Self {
        DefineValue::Bool(v)
    }
}

impl From<u32> for DefineValue {
    fn from(v: u32) -> Self {
        DefineValue::U32(v)
    }
}

impl From<i32> for DefineValue {
    fn from(v: i32) -> Self {
        DefineValue::I32(v)
    }
}

impl From<f32> for DefineValue {
    fn from(v: f32) -> Self {
        DefineValue::F32(v)
    }
}

impl DefineValue {
    fn literal(&self) -> Option<String> {
        Some(match *self {
            DefineValue::Flag => "true".to_string(),
            DefineValue::Bool(b) => b.to_string(),
            DefineValue::U32(v) => format!("{v}u"),
            // `2147483648i` is out of range before negation applies.
            DefineValue::I32(i32::MIN) => "i32(-2147483647 - 1)".to_string(),
            DefineValue::I32(v) => format!("{v}i"),
            DefineValue::F32(v) if v.is_finite() => format!("{v:?}f"),
            DefineValue::F32(_) => return None,
        })
    }
}

/// Ordered set of compile-time constants injected into every stage of a program.
///
/// Each entry becomes one module-scope `const NAME = value;` line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Defines {
    entries: BTreeMap<String, DefineValue>,
}

impl Defines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flag(self, name: impl Into<String>) -> Self {
        self.with(name, DefineValue::Flag)
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<DefineValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<DefineValue>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<DefineValue> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DefineValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Renders the textual block, one line per define, in name order.
    pub fn render(&self) -> Result<String, ShaderError> {
        let mut out = String::new();
        for (name, value) in &self.entries {
            if !is_identifier(name) {
                return Err(ShaderError::InvalidDefine {
                    name: name.clone(),
                    reason: "not a valid identifier".into(),
                });
            }
            let Some(literal) = value.literal() else {
                return Err(ShaderError::InvalidDefine {
                    name: name.clone(),
                    reason: "value is not finite".into(),
                });
            };
            let _ = writeln!(out, "const {name} = {literal};");
        }
        Ok(out)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if name == "_" || name.starts_with("__") {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_in_name_order() {
        let d = Defines::new()
            .with("SCENE_SIZE", 100u32)
            .with("CAPACITY", 8u32)
            .flag("OUTER_RADIUS");
        assert_eq!(
            d.render().unwrap(),
            "const CAPACITY = 8u;\nconst OUTER_RADIUS = true;\nconst SCENE_SIZE = 100u;\n"
        );
    }

    #[test]
    fn renders_typed_literals() {
        let d = Defines::new()
            .with("A", -3i32)
            .with("B", 1.0f32)
            .with("C", 1e20f32)
            .with("D", false);
        let text = d.render().unwrap();
        assert!(text.contains("const A = -3i;"));
        assert!(text.contains("const B = 1.0f;"));
        assert!(text.contains("const C = 1e20f;"));
        assert!(text.contains("const D = false;"));
    }

    #[test]
    fn i32_extremes_render_as_valid_wgsl() {
        let d = Defines::new().with("LO", i32::MIN).with("HI", i32::MAX);
        let text = d.render().unwrap();
        assert!(text.contains("const LO = i32(-2147483647 - 1);"));
        assert!(text.contains("const HI = 2147483647i;"));

        let module = naga::front::wgsl::parse_str(&format!(
            "{text}@compute @workgroup_size(1) fn main() {{ let x: i32 = LO; }}"
        ))
        .unwrap();
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&module)
        .unwrap();
    }

    #[test]
    fn empty_renders_nothing() {
        assert_eq!(Defines::new().render().unwrap(), "");
    }

    #[test]
    fn set_replaces_value() {
        let mut d = Defines::new().with("CAPACITY", 8u32);
        d.set("CAPACITY", 16u32);
        assert_eq!(d.len(), 1);
        assert_eq!(d.get("CAPACITY"), Some(DefineValue::U32(16)));
    }

    #[test]
    fn rejects_bad_identifiers() {
        for bad in ["", "1ABC", "A-B", "_", "__X", "a b"] {
            let d = Defines::new().flag(bad);
            assert!(
                matches!(d.render(), Err(ShaderError::InvalidDefine { .. })),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn rejects_non_finite_floats() {
        let d = Defines::new().with("FAR", f32::INFINITY);
        assert!(matches!(d.render(), Err(ShaderError::InvalidDefine { .. })));
    }
}
