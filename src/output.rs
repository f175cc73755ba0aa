use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io::{self, Write};

/// Writes `value` as tab-indented JSON followed by a blank separator line.
pub fn write_record<W, T>(writer: &mut W, value: &T) -> io::Result<()>
where
    W: Write + ?Sized,
    T: Serialize + ?Sized,
{
    let mut serializer =
        Serializer::with_formatter(&mut *writer, PrettyFormatter::with_indent(b"\t"));
    value.serialize(&mut serializer).map_err(io::Error::from)?;
    writer.write_all(b"\n\n")
}
