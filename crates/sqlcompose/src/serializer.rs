use std::fmt::{self, Write as _};

use crate::config::{ParameterStyle, SerializerConfig};
use crate::error::Result;

/// Render self as SQL text into a serializer context.
pub trait Serialize {
    fn serialize(&self, ctx: &mut SerializerContext) -> Result<()>;
}

/// Auto-implement for references.
impl<S: Serialize + ?Sized> Serialize for &S {
    fn serialize(&self, ctx: &mut SerializerContext) -> Result<()> {
        Serialize::serialize(*self, ctx)
    }
}

impl<S: Serialize + ?Sized> Serialize for Box<S> {
    fn serialize(&self, ctx: &mut SerializerContext) -> Result<()> {
        self.as_ref().serialize(ctx)
    }
}

/// Text sink for a single rendering pass.
#[derive(Debug)]
pub struct SerializerContext<'a> {
    config: &'a SerializerConfig,
    buf: String,
    /// Number of parameter placeholders written so far.
    param_count: usize,
}

impl<'a> SerializerContext<'a> {
    pub fn new(config: &'a SerializerConfig) -> Self {
        SerializerContext {
            config,
            buf: String::new(),
            param_count: 0,
        }
    }

    pub fn config(&self) -> &SerializerConfig {
        self.config
    }

    /// Write an identifier, quoting it if configured.
    pub fn write_ident(&mut self, ident: &str) -> Result<()> {
        if self.config.quote_identifiers {
            self.buf.push('"');
            for c in ident.chars() {
                if c == '"' {
                    self.buf.push('"');
                }
                self.buf.push(c);
            }
            self.buf.push('"');
        } else {
            self.buf.push_str(ident);
        }
        Ok(())
    }

    /// Write the next parameter placeholder.
    pub fn write_parameter(&mut self) -> Result<()> {
        self.param_count += 1;
        match self.config.parameter_style {
            ParameterStyle::QuestionMark => self.buf.push('?'),
            ParameterStyle::Dollar => write!(self.buf, "${}", self.param_count)?,
        }
        Ok(())
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

impl fmt::Write for SerializerContext<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf.push_str(s);
        Ok(())
    }
}

/// Render `item` to a string using the given config.
pub fn to_sql<S: Serialize + ?Sized>(item: &S, config: &SerializerConfig) -> Result<String> {
    let mut ctx = SerializerContext::new(config);
    item.serialize(&mut ctx)?;
    Ok(ctx.into_string())
}
