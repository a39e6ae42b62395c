// JSON Line Record Encoding
// {"time":..,"level":..,"logger":..,"linenum":..,"msg":.., <fields in call order>}

use chrono::{DateTime, Utc};
use sqlog_core::port::{Field, Level};
use std::panic::Location;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Keys every record carries; caller fields with these names are emitted as `fields.<key>`
const RESERVED_KEYS: [&str; 6] = ["time", "level", "logger", "linenum", "msg", "stacktrace"];

pub(crate) struct RecordMeta<'a> {
    pub time: DateTime<Utc>,
    pub level: Level,
    pub logger: &'a str,
    pub caller: &'static Location<'static>,
    pub message: &'a str,
}

/// `dir/file.rs:line`, keeping only the last directory
pub(crate) fn short_caller(caller: &Location<'_>) -> String {
    let file = caller.file();
    let mut parts = file.rsplitn(3, |c: char| c == '/' || c == '\\');
    let name = parts.next().unwrap_or(file);
    let short = match parts.next() {
        Some(dir) => format!("{}/{}", dir, name),
        None => name.to_string(),
    };
    format!("{}:{}", short, caller.line())
}

fn push_entry(buf: &mut Vec<u8>, first: &mut bool, key: &str, value: &serde_json::Value) {
    if !*first {
        buf.push(b',');
    }
    *first = false;
    // Serializing str and Value into a Vec cannot fail
    let _ = serde_json::to_writer(&mut *buf, key);
    buf.push(b':');
    let _ = serde_json::to_writer(&mut *buf, value);
}

/// One record as a single newline-terminated line
pub(crate) fn encode_record(
    meta: &RecordMeta<'_>,
    fields: &[Field],
    stacktrace: Option<&str>,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);
    let mut first = true;
    buf.push(b'{');

    let level = meta.level.as_str().to_ascii_lowercase();
    push_entry(&mut buf, &mut first, "time", &meta.time.format(TIME_FORMAT).to_string().into());
    push_entry(&mut buf, &mut first, "level", &level.into());
    push_entry(&mut buf, &mut first, "logger", &meta.logger.into());
    push_entry(&mut buf, &mut first, "linenum", &short_caller(meta.caller).into());
    push_entry(&mut buf, &mut first, "msg", &meta.message.into());

    for field in fields {
        if RESERVED_KEYS.contains(&&*field.key) {
            let key = format!("fields.{}", field.key);
            push_entry(&mut buf, &mut first, &key, &field.value);
        } else {
            push_entry(&mut buf, &mut first, &field.key, &field.value);
        }
    }

    if let Some(trace) = stacktrace {
        push_entry(&mut buf, &mut first, "stacktrace", &trace.into());
    }

    buf.extend_from_slice(b"}\n");
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sqlog_core::Value;

    fn meta(level: Level) -> RecordMeta<'static> {
        RecordMeta {
            time: Utc.with_ymd_and_hms(2026, 10, 14, 8, 30, 0).unwrap()
                + chrono::Duration::milliseconds(123),
            level,
            logger: "sql",
            caller: Location::caller(),
            message: "sql get",
        }
    }

    #[test]
    fn test_record_keys_and_order() {
        let fields = vec![
            Field::string("query", "SELECT * FROM t WHERE id = ?"),
            Field::args("args", &[Value::Int(1)]),
            Field::error(None::<&str>),
            Field::int("cost", 3),
        ];
        let line = encode_record(&meta(Level::INFO), &fields, None);
        let text = String::from_utf8(line).unwrap();

        assert!(text.ends_with("}\n"));
        assert!(text.starts_with(
            concat!(
                r#"{"time":"2026-10-14T08:30:00.123Z","level":"info","logger":"sql","#,
                r#""linenum":"src/encoding.rs:"#,
            )
        ));
        assert!(text.contains(
            concat!(
                r#""msg":"sql get","query":"SELECT * FROM t WHERE id = ?","#,
                r#""args":[1],"error":null,"cost":3}"#,
            )
        ));

        let parsed: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(parsed["cost"], 3);
    }

    #[test]
    fn test_reserved_keys_are_namespaced() {
        let fields = vec![Field::string("msg", "shadow"), Field::string("level", "debug")];
        let text = String::from_utf8(encode_record(&meta(Level::ERROR), &fields, None)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();

        assert_eq!(parsed["msg"], "sql get");
        assert_eq!(parsed["level"], "error");
        assert_eq!(parsed["fields.msg"], "shadow");
        assert_eq!(parsed["fields.level"], "debug");
    }

    #[test]
    fn test_stacktrace_is_last() {
        let text = String::from_utf8(encode_record(
            &meta(Level::ERROR),
            &[Field::int("n", 1)],
            Some("frame 0\nframe 1"),
        ))
        .unwrap();
        assert!(text
            .trim_end()
            .ends_with(r#""n":1,"stacktrace":"frame 0\nframe 1"}"#));
    }

    #[test]
    fn test_short_caller() {
        let location = Location::caller();
        let short = short_caller(location);
        assert!(short.starts_with("src/encoding.rs:"), "{}", short);
    }
}
