//! Primitive values and their conversions.

use std::fmt;
use zoola_ir::PrimitiveKind;

/// A primitive value. `char` is a UTF-16 code unit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Primitive {
    Bool(bool),
    Char(u16),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Primitive {
    pub const fn kind(self) -> PrimitiveKind {
        match self {
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::Char(_) => PrimitiveKind::Char,
            Self::Byte(_) => PrimitiveKind::Byte,
            Self::Short(_) => PrimitiveKind::Short,
            Self::Int(_) => PrimitiveKind::Int,
            Self::Long(_) => PrimitiveKind::Long,
            Self::Float(_) => PrimitiveKind::Float,
            Self::Double(_) => PrimitiveKind::Double,
        }
    }

    /// Zero value of a primitive kind.
    pub const fn default_for(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Bool => Self::Bool(false),
            PrimitiveKind::Char => Self::Char(0),
            PrimitiveKind::Byte => Self::Byte(0),
            PrimitiveKind::Short => Self::Short(0),
            PrimitiveKind::Int => Self::Int(0),
            PrimitiveKind::Long => Self::Long(0),
            PrimitiveKind::Float => Self::Float(0.0),
            PrimitiveKind::Double => Self::Double(0.0),
        }
    }

    pub const fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Integral value widened to `i64`; `None` for bool and floating kinds.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::Char(c) => Some(i64::from(c)),
            Self::Byte(b) => Some(i64::from(b)),
            Self::Short(s) => Some(i64::from(s)),
            Self::Int(i) => Some(i64::from(i)),
            Self::Long(l) => Some(l),
            Self::Bool(_) | Self::Float(_) | Self::Double(_) => None,
        }
    }

    /// Value as an `int` if it is an int-width integral (byte, short, char, int).
    pub fn as_int(self) -> Option<i32> {
        match self {
            Self::Char(c) => Some(i32::from(c)),
            Self::Byte(b) => Some(i32::from(b)),
            Self::Short(s) => Some(i32::from(s)),
            Self::Int(i) => Some(i),
            _ => None,
        }
    }

    /// Numeric value widened to `f64`; `None` for bool.
    #[expect(clippy::cast_precision_loss, reason = "long to double widening is lossy by definition")]
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(f64::from(f)),
            Self::Double(d) => Some(d),
            Self::Long(l) => Some(l as f64),
            Self::Bool(_) => None,
            other => other.as_int().map(f64::from),
        }
    }

    /// Cast-context conversion to `target`.
    ///
    /// Numeric kinds convert to each other with truncation and wrapping;
    /// bool converts only to bool.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        reason = "narrowing conversions are the point of a cast"
    )]
    pub fn convert(self, target: PrimitiveKind) -> Option<Primitive> {
        if self.kind() == target {
            return Some(self);
        }
        if matches!(self, Self::Bool(_)) || target == PrimitiveKind::Bool {
            return None;
        }
        // Floating sources narrow through int (or long) like the host language.
        let converted = match (self, target) {
            (Self::Float(_) | Self::Double(_), PrimitiveKind::Long) => {
                Self::Long(self.as_f64().map_or(0, |d| d as i64))
            }
            (Self::Float(_) | Self::Double(_), PrimitiveKind::Float) => {
                Self::Float(self.as_f64().map_or(0.0, |d| d as f32))
            }
            (Self::Float(_) | Self::Double(_), PrimitiveKind::Double) => {
                Self::Double(self.as_f64().unwrap_or(0.0))
            }
            (Self::Float(_) | Self::Double(_), _) => {
                let int = self.as_f64().map_or(0, |d| d as i32);
                return Self::Int(int).convert(target);
            }
            (_, PrimitiveKind::Float) => Self::Float(match self.as_i64() {
                Some(l) => l as f32,
                None => return None,
            }),
            (_, PrimitiveKind::Double) => Self::Double(match self.as_i64() {
                Some(l) => l as f64,
                None => return None,
            }),
            _ => {
                let bits = self.as_i64()?;
                match target {
                    PrimitiveKind::Char => Self::Char(bits as u16),
                    PrimitiveKind::Byte => Self::Byte(bits as i8),
                    PrimitiveKind::Short => Self::Short(bits as i16),
                    PrimitiveKind::Int => Self::Int(bits as i32),
                    PrimitiveKind::Long => Self::Long(bits),
                    PrimitiveKind::Bool | PrimitiveKind::Float | PrimitiveKind::Double => {
                        return None
                    }
                }
            }
        };
        Some(converted)
    }

    /// Assignment-context conversion: widening, plus narrowing of an
    /// int-width value into byte/short/char when it fits.
    pub fn assign_to(self, target: PrimitiveKind) -> Option<Primitive> {
        let source = self.kind();
        if source == target || is_widening(source, target) {
            return self.convert(target);
        }
        let value = self.as_int()?;
        let fits = match target {
            PrimitiveKind::Byte => i8::try_from(value).is_ok(),
            PrimitiveKind::Short => i16::try_from(value).is_ok(),
            PrimitiveKind::Char => u16::try_from(value).is_ok(),
            _ => false,
        };
        if fits {
            self.convert(target)
        } else {
            None
        }
    }

    /// Key identifying equal primitive values, used for monitor lookup.
    pub(crate) fn identity_bits(self) -> (PrimitiveKind, u64) {
        #[expect(clippy::cast_sign_loss, reason = "bit pattern only")]
        let bits = match self {
            Self::Bool(b) => u64::from(b),
            Self::Float(f) => u64::from(f.to_bits()),
            Self::Double(d) => d.to_bits(),
            other => other.as_i64().unwrap_or(0) as u64,
        };
        (self.kind(), bits)
    }
}

/// Widening primitive conversion table.
pub fn is_widening(from: PrimitiveKind, to: PrimitiveKind) -> bool {
    use PrimitiveKind::{Byte, Char, Double, Float, Int, Long, Short};
    matches!(
        (from, to),
        (Byte, Short | Int | Long | Float | Double)
            | (Short | Char, Int | Long | Float | Double)
            | (Int, Long | Float | Double)
            | (Long, Float | Double)
            | (Float, Double)
    )
}

fn fmt_floating(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        write!(f, "NaN")
    } else if value.is_infinite() {
        write!(f, "{}", if value > 0.0 { "Infinity" } else { "-Infinity" })
    } else if value.fract() == 0.0 && value.abs() < 1e7 {
        write!(f, "{value:.1}")
    } else {
        write!(f, "{value}")
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Char(c) => match char::from_u32(u32::from(c)) {
                Some(ch) => write!(f, "{ch}"),
                None => write!(f, "\\u{c:04x}"),
            },
            Self::Byte(b) => write!(f, "{b}"),
            Self::Short(s) => write!(f, "{s}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Long(l) => write!(f, "{l}"),
            Self::Float(x) => fmt_floating(f, f64::from(x)),
            Self::Double(x) => fmt_floating(f, x),
        }
    }
}
