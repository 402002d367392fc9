//! `--sign(,mode=plain_text|formatted_legacy|raw)`: sign text and orientation.
//!
//! Modern saves store each line as a JSON text component. The line is
//! flattened according to [`SignTextMode`]; anything that is not valid JSON
//! is written as-is.

use core::fmt;
use core::str::FromStr;

use scan_output::Output;
use scan_world::{Chunk, ResourceLocation, TileEntity, TileEntityData, TileEntityKind};
use serde_json::Value;

use super::{close_output, emit, key_value};
use crate::records::SignRecord;
use crate::{AnyCriterion, Criterion, InitContext, ScanError, ScanResult, TileEntityCriterion};

const FLAG: &str = "--sign";

pub fn from_args(args: &[&str]) -> ScanResult<AnyCriterion> {
    let mut mode = SignTextMode::default();
    for &arg in args {
        match key_value(FLAG, arg)? {
            ("mode", value) => mode = value.parse()?,
            _ => return Err(ScanError::invalid(FLAG, format!("invalid argument: {arg}"))),
        }
    }
    Ok(AnyCriterion::TileEntity(Box::new(SignCriterion::new(mode))))
}

/// How sign lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignTextMode {
    /// Concatenated text without formatting.
    #[default]
    PlainText,
    /// Text with `§` color and style codes.
    FormattedLegacy,
    /// The stored line, untouched.
    Raw,
}

impl FromStr for SignTextMode {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain_text" => Ok(Self::PlainText),
            "formatted_legacy" => Ok(Self::FormattedLegacy),
            "raw" => Ok(Self::Raw),
            other => Err(ScanError::invalid(FLAG, format!("unknown mode: {other}"))),
        }
    }
}

impl fmt::Display for SignTextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PlainText => "plain_text",
            Self::FormattedLegacy => "formatted_legacy",
            Self::Raw => "raw",
        })
    }
}

impl SignTextMode {
    /// Render one stored line.
    #[must_use]
    pub fn render(self, line: &str) -> String {
        if self == Self::Raw {
            return line.to_string();
        }
        let Ok(value) = serde_json::from_str::<Value>(line) else {
            return line.to_string();
        };
        let mut out = String::new();
        flatten(&value, &Style::default(), self == Self::FormattedLegacy, &mut out);
        out
    }
}

/// Inherited formatting of a text component.
#[derive(Debug, Clone, Copy, Default)]
struct Style {
    color: Option<char>,
    bold: bool,
    italic: bool,
    underlined: bool,
    strikethrough: bool,
    obfuscated: bool,
}

impl Style {
    fn child(mut self, component: &serde_json::Map<String, Value>) -> Self {
        if let Some(code) = component
            .get("color")
            .and_then(Value::as_str)
            .and_then(color_code)
        {
            self.color = Some(code);
        }
        let flag = |name: &str, current: bool| {
            component.get(name).and_then(Value::as_bool).unwrap_or(current)
        };
        self.bold = flag("bold", self.bold);
        self.italic = flag("italic", self.italic);
        self.underlined = flag("underlined", self.underlined);
        self.strikethrough = flag("strikethrough", self.strikethrough);
        self.obfuscated = flag("obfuscated", self.obfuscated);
        self
    }

    const fn is_plain(&self) -> bool {
        self.color.is_none()
            && !self.bold
            && !self.italic
            && !self.underlined
            && !self.strikethrough
            && !self.obfuscated
    }

    fn write_codes(&self, out: &mut String) {
        let codes = [
            (self.color.is_some(), self.color.unwrap_or('f')),
            (self.obfuscated, 'k'),
            (self.bold, 'l'),
            (self.strikethrough, 'm'),
            (self.underlined, 'n'),
            (self.italic, 'o'),
        ];
        for (_, code) in codes.into_iter().filter(|(on, _)| *on) {
            out.push('§');
            out.push(code);
        }
    }
}

fn color_code(name: &str) -> Option<char> {
    Some(match name {
        "black" => '0',
        "dark_blue" => '1',
        "dark_green" => '2',
        "dark_aqua" => '3',
        "dark_red" => '4',
        "dark_purple" => '5',
        "gold" => '6',
        "gray" => '7',
        "dark_gray" => '8',
        "blue" => '9',
        "green" => 'a',
        "aqua" => 'b',
        "red" => 'c',
        "light_purple" => 'd',
        "yellow" => 'e',
        "white" => 'f',
        _ => return None,
    })
}

fn flatten(value: &Value, parent: &Style, formatted: bool, out: &mut String) {
    match value {
        Value::String(text) => push_text(text, parent, formatted, out),
        Value::Array(parts) => {
            for part in parts {
                flatten(part, parent, formatted, out);
            }
        }
        Value::Object(component) => {
            let style = parent.child(component);
            if let Some(text) = component.get("text").and_then(Value::as_str) {
                push_text(text, &style, formatted, out);
            }
            if let Some(Value::Array(extra)) = component.get("extra") {
                for part in extra {
                    flatten(part, &style, formatted, out);
                }
            }
        }
        Value::Null => {}
        other => out.push_str(&other.to_string()),
    }
}

fn push_text(text: &str, style: &Style, formatted: bool, out: &mut String) {
    if text.is_empty() {
        return;
    }
    if formatted && !style.is_plain() {
        style.write_codes(out);
        out.push_str(text);
        out.push_str("§r");
    } else {
        out.push_str(text);
    }
}

const STANDING_DIRECTIONS: [&str; 16] = [
    "south",
    "south-southwest",
    "southwest",
    "west-southwest",
    "west",
    "west-northwest",
    "northwest",
    "north-northwest",
    "north",
    "north-northeast",
    "northeast",
    "east-northeast",
    "east",
    "east-southeast",
    "southeast",
    "south-southeast",
];

const fn wall_direction(meta: u8) -> &'static str {
    match meta {
        2 => "north",
        3 => "south",
        4 => "west",
        5 => "east",
        _ => "unknown",
    }
}

/// Signs, matched by structural kind.
pub struct SignCriterion {
    mode: SignTextMode,
    standing_sign: Option<u16>,
    wall_sign: Option<u16>,
    output: Option<Output<SignRecord>>,
}

impl SignCriterion {
    #[must_use]
    pub const fn new(mode: SignTextMode) -> Self {
        Self {
            mode,
            standing_sign: None,
            wall_sign: None,
            output: None,
        }
    }

    /// Block type and facing of the sign block under a tile entity.
    fn orientation(&self, chunk: &Chunk, tile_entity: &TileEntity) -> (String, &'static str) {
        let x = (tile_entity.x & 15) as usize;
        let z = (tile_entity.z & 15) as usize;
        let id = chunk.block_id(x, tile_entity.y, z);
        let meta = chunk.block_meta(x, tile_entity.y, z);

        if Some(id) == self.standing_sign {
            (
                "standing_sign".to_string(),
                STANDING_DIRECTIONS[usize::from(meta & 15)],
            )
        } else if Some(id) == self.wall_sign {
            ("wall_sign".to_string(), wall_direction(meta))
        } else {
            (format!("invalid_id_{id}"), "unknown")
        }
    }
}

impl fmt::Display for SignCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            SignTextMode::PlainText => f.write_str("Signs"),
            mode => write!(f, "Signs (mode={mode})"),
        }
    }
}

impl Criterion for SignCriterion {
    fn init(&mut self, ctx: &InitContext<'_>) -> ScanResult<()> {
        self.standing_sign = ctx.lookup_block(&ResourceLocation::minecraft("standing_sign"));
        self.wall_sign = ctx.lookup_block(&ResourceLocation::minecraft("wall_sign"));
        self.output = Some(ctx.open(&self.to_string())?);
        Ok(())
    }

    fn close(&mut self) -> ScanResult<()> {
        close_output(&mut self.output)
    }
}

impl TileEntityCriterion for SignCriterion {
    fn visit(&self, chunk: &Chunk, tile_entity: &TileEntity) {
        if tile_entity.kind() == TileEntityKind::Sign {
            self.accept_match(chunk, tile_entity);
        }
    }

    fn kind_filter(&self) -> Option<TileEntityKind> {
        Some(TileEntityKind::Sign)
    }

    fn accept_match(&self, chunk: &Chunk, tile_entity: &TileEntity) {
        let TileEntityData::Sign { lines } = &tile_entity.data else {
            return;
        };
        let (kind, direction) = self.orientation(chunk, tile_entity);
        emit(
            self.output.as_ref(),
            &SignRecord {
                x: tile_entity.x,
                y: tile_entity.y,
                z: tile_entity.z,
                lines: lines.each_ref().map(|line| self.mode.render(line)),
                kind,
                direction,
            },
        );
    }
}
