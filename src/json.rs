//! The Haystack JSON encoding.
//!
//! Grids are encoded as an object with `meta`, `cols` and `rows` members.
//! Booleans are native JSON booleans and lists are arrays; every other kind
//! is a string with a one-letter type prefix:
//!
//! | Kind | Encoding |
//! |------|----------|
//! | Marker | `"m:"` |
//! | Remove | `"-:"` |
//! | NA | `"z:"` |
//! | Number | `"n:72.5 °F"`, `"n:INF"`, `"n:NaN"` |
//! | Str | `"hello"`, or `"s:a:b"` when the text itself looks prefixed |
//! | Uri | `"u:http://host/"` |
//! | Ref | `"r:id Display"` |
//! | Date | `"d:2024-03-15"` |
//! | Time | `"h:08:30:00"` |
//! | DateTime | `"t:2024-03-15T08:30:00-04:00 New_York"` |
//! | Coord | `"c:37.5458,-77.4"` |
//! | Bin | `"b:text/plain"` |
//! | Symbol | `"y:site"` |
//! | XStr | `"x:Span:today"` |
//!
//! Absent cells are omitted from row objects; `null` decodes as absent.
//!
//! ```rust
//! use serde_haystack::{from_json_str, to_json_string, dicts_to_grid, dict, Dict};
//!
//! let rec = dict! { "site", "area" => 100 }.unwrap();
//! let grid = dicts_to_grid(&Dict::empty(), &[Some(rec)]);
//!
//! let json = to_json_string(&grid).unwrap();
//! assert_eq!(json, r#"{"meta":{"ver":"3.0"},"cols":[{"name":"area"},{"name":"site"}],"rows":[{"area":"n:100","site":"m:"}]}"#);
//! assert_eq!(from_json_str(&json).unwrap(), grid);
//! ```

use crate::de::ZincReader;
use crate::value::micro_to_str;
use crate::{
    Bin, Coord, Dict, DictBuilder, Error, Grid, GridBuilder, Number, Ref, Result, Symbol, Value,
    XStr,
};
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as Json};
use std::fmt;
use tracing::debug;

const JSON_VERSION: &str = "3.0";

/// Encodes a value as JSON.
///
/// # Examples
///
/// ```rust
/// use serde_haystack::{json, Number, Value};
///
/// let n = Value::from(Number::with_unit(21.5, "°C").unwrap());
/// assert_eq!(json::value_to_json(&n), serde_json::json!("n:21.5 °C"));
/// assert_eq!(json::value_to_json(&Value::Bool(true)), serde_json::json!(true));
/// ```
#[must_use]
pub fn value_to_json(val: &Value) -> Json {
    match val {
        Value::Bool(b) => Json::Bool(*b),
        Value::List(items) => Json::Array(items.iter().map(value_to_json).collect()),
        other => Json::String(encode_str(other)),
    }
}

/// Decodes a JSON value; `null` is absent.
///
/// # Errors
///
/// Returns [`Error::Parse`] for an unknown type prefix, a malformed payload,
/// a JSON object, or `null` inside an array.
pub fn value_from_json(json: &Json) -> Result<Option<Value>> {
    match json {
        Json::Null => Ok(None),
        Json::Bool(b) => Ok(Some(Value::Bool(*b))),
        Json::Number(n) => n
            .as_f64()
            .map(|f| Some(Value::Number(Number::new(f))))
            .ok_or_else(|| Error::parse(0, format!("Invalid JSON number {}", n))),
        Json::String(s) => decode_str(s).map(Some),
        Json::Array(items) => items
            .iter()
            .map(|item| {
                value_from_json(item)?
                    .ok_or_else(|| Error::parse(0, "null is not allowed inside a list"))
            })
            .collect::<Result<Vec<_>>>()
            .map(|items| Some(Value::List(items))),
        Json::Object(_) => Err(Error::parse(0, "JSON object is not a scalar value")),
    }
}

/// Encodes a dict as a JSON object.
#[must_use]
pub fn dict_to_json(dict: &Dict) -> Json {
    let mut map = Map::with_capacity(dict.len());
    for (name, val) in dict {
        map.insert(name.clone(), value_to_json(val));
    }
    Json::Object(map)
}

/// Decodes a JSON object into a dict, skipping `null` members.
///
/// # Errors
///
/// Returns [`Error::Parse`] if `json` is not an object or a member does not
/// decode.
pub fn dict_from_json(json: &Json) -> Result<Dict> {
    let map = json
        .as_object()
        .ok_or_else(|| Error::parse(0, "Expected JSON object for dict"))?;
    dict_from_map(map, |_| false)
}

fn dict_from_map<F: Fn(&str) -> bool>(map: &Map<String, Json>, skip: F) -> Result<Dict> {
    let mut b = DictBuilder::with_capacity(map.len());
    for (name, val) in map {
        if skip(name) {
            continue;
        }
        let val = value_from_json(val)?;
        b.add_opt(name.as_str(), val).map_err(to_parse)?;
    }
    Ok(b.into_dict())
}

/// Encodes a grid as a JSON object.
#[must_use]
pub fn grid_to_json(grid: &Grid) -> Json {
    let mut meta = Map::with_capacity(grid.meta().len() + 1);
    meta.insert("ver".to_string(), Json::String(JSON_VERSION.to_string()));
    for (name, val) in grid.meta() {
        meta.insert(name.clone(), value_to_json(val));
    }

    let cols = grid
        .cols()
        .map(|col| {
            let mut obj = Map::with_capacity(col.meta().len() + 1);
            obj.insert("name".to_string(), Json::String(col.name().to_string()));
            for (name, val) in col.meta() {
                obj.insert(name.clone(), value_to_json(val));
            }
            Json::Object(obj)
        })
        .collect();

    let rows = grid
        .iter()
        .map(|row| {
            let obj = row
                .iter()
                .map(|(name, val)| (name.to_string(), value_to_json(val)))
                .collect();
            Json::Object(obj)
        })
        .collect();

    let mut root = Map::with_capacity(3);
    root.insert("meta".to_string(), Json::Object(meta));
    root.insert("cols".to_string(), Json::Array(cols));
    root.insert("rows".to_string(), Json::Array(rows));
    Json::Object(root)
}

/// Decodes a grid from its JSON object form.
///
/// # Errors
///
/// Returns [`Error::Parse`] when `meta.ver` is not `"3.0"`, a member is
/// missing or has the wrong JSON type, a row names a column that was not
/// declared, or a value does not decode.
pub fn grid_from_json(json: &Json) -> Result<Grid> {
    let root = json
        .as_object()
        .ok_or_else(|| Error::parse(0, "Expected JSON object for grid"))?;

    let meta = member(root, "meta")?
        .as_object()
        .ok_or_else(|| Error::parse(0, "Grid 'meta' must be an object"))?;
    match meta.get("ver") {
        Some(Json::String(v)) if v == JSON_VERSION => {}
        Some(other) => return Err(Error::parse(0, format!("Unsupported grid version {}", other))),
        None => return Err(Error::parse(0, "Grid meta has no 'ver'")),
    }

    let mut b = GridBuilder::new();
    b.set_meta(&dict_from_map(meta, |name| name == "ver")?);

    let cols = member(root, "cols")?
        .as_array()
        .ok_or_else(|| Error::parse(0, "Grid 'cols' must be an array"))?;
    let mut names = Vec::with_capacity(cols.len());
    for col in cols {
        let obj = col
            .as_object()
            .ok_or_else(|| Error::parse(0, format!("Column must be an object, not {}", col)))?;
        let name = match obj.get("name") {
            Some(Json::String(name)) => name.clone(),
            _ => return Err(Error::parse(0, format!("Column has no string 'name': {}", col))),
        };
        let meta = dict_from_map(obj, |n| n == "name")?;
        b.add_col(name.as_str()).map_err(to_parse)?.add_all(&meta);
        names.push(name);
    }

    let rows = member(root, "rows")?
        .as_array()
        .ok_or_else(|| Error::parse(0, "Grid 'rows' must be an array"))?;
    for row in rows {
        let obj = row
            .as_object()
            .ok_or_else(|| Error::parse(0, format!("Row must be an object, not {}", row)))?;
        if let Some(unknown) = obj.keys().find(|k| !names.contains(k)) {
            return Err(Error::parse(0, format!("Row has unknown column {:?}", unknown)));
        }
        let cells = names
            .iter()
            .map(|name| obj.get(name).map_or(Ok(None), value_from_json))
            .collect::<Result<Vec<_>>>()?;
        b.add_row(cells).map_err(to_parse)?;
    }

    let grid = b.build().map_err(to_parse)?;
    debug!(cols = grid.num_cols(), rows = grid.num_rows(), "read json grid");
    Ok(grid)
}

fn member<'a>(obj: &'a Map<String, Json>, name: &str) -> Result<&'a Json> {
    obj.get(name)
        .ok_or_else(|| Error::parse(0, format!("Grid has no '{}' member", name)))
}

fn to_parse(err: Error) -> Error {
    match err {
        Error::InvalidArgument(msg) => Error::parse(0, msg),
        other => other,
    }
}

/// The prefixed string form of every kind except Bool and List.
fn encode_str(val: &Value) -> String {
    match val {
        Value::Marker => "m:".to_string(),
        Value::Remove => "-:".to_string(),
        Value::NA => "z:".to_string(),
        Value::Number(n) => {
            let mut s = format!("n:{}", Number::new(n.val()));
            if let Some(unit) = n.unit() {
                s.push(' ');
                s.push_str(unit);
            }
            s
        }
        Value::Str(s) if looks_prefixed(s) => format!("s:{}", s),
        Value::Str(s) => s.clone(),
        Value::Uri(u) => format!("u:{}", u),
        Value::Ref(r) => match r.dis() {
            Some(dis) => format!("r:{} {}", r.id(), dis),
            None => format!("r:{}", r.id()),
        },
        Value::Date(d) => format!("d:{}", d),
        Value::Time(t) => format!("h:{}", t),
        Value::DateTime(ts) => format!("t:{}", ts),
        Value::Coord(c) => {
            let mut s = String::from("c:");
            micro_to_str(&mut s, c.micro_lat());
            s.push(',');
            micro_to_str(&mut s, c.micro_lng());
            s
        }
        Value::Bin(b) => format!("b:{}", b.mime()),
        Value::Symbol(sym) => format!("y:{}", sym.name()),
        Value::XStr(x) => format!("x:{}:{}", x.type_name(), x.val()),
        Value::Bool(b) => b.to_string(),
        Value::List(_) => val.to_string(),
    }
}

fn looks_prefixed(s: &str) -> bool {
    s.as_bytes().get(1) == Some(&b':')
}

fn decode_str(s: &str) -> Result<Value> {
    if !looks_prefixed(s) {
        return Ok(Value::Str(s.to_string()));
    }
    let payload = &s[2..];
    let bad = |what: &str| Error::parse(0, format!("Invalid {} {:?}", what, s));
    let val = match s.as_bytes()[0] {
        b'm' => Value::Marker,
        b'-' => Value::Remove,
        b'z' => Value::NA,
        b's' => Value::Str(payload.to_string()),
        b'u' => Value::Uri(payload.to_string()),
        b'n' => {
            let (num, unit) = match payload.split_once(' ') {
                Some((num, unit)) => (num, Some(unit)),
                None => (payload, None),
            };
            let val = match num {
                "INF" => f64::INFINITY,
                "-INF" => f64::NEG_INFINITY,
                "NaN" => f64::NAN,
                _ => num.parse().map_err(|_| bad("number"))?,
            };
            match unit {
                Some(unit) => Value::Number(Number::with_unit(val, unit).map_err(to_parse)?),
                None => Value::Number(Number::new(val)),
            }
        }
        b'r' => {
            let r = match payload.split_once(' ') {
                Some((id, dis)) => Ref::with_dis(id, dis),
                None => Ref::new(payload),
            };
            Value::Ref(r.map_err(to_parse)?)
        }
        b'd' | b'h' | b't' => {
            let val = ZincReader::from_str(payload)
                .read_scalar()
                .map_err(|e| Error::parse(0, format!("{} in {:?}", e, s)))?;
            match (s.as_bytes()[0], val) {
                (b'd', Some(v @ Value::Date(_)))
                | (b'h', Some(v @ Value::Time(_)))
                | (b't', Some(v @ Value::DateTime(_))) => v,
                _ => return Err(bad("temporal value")),
            }
        }
        b'c' => {
            let (lat, lng) = payload.split_once(',').ok_or_else(|| bad("coord"))?;
            let lat: f64 = lat.trim().parse().map_err(|_| bad("coord"))?;
            let lng: f64 = lng.trim().parse().map_err(|_| bad("coord"))?;
            Value::Coord(Coord::make(lat, lng).map_err(to_parse)?)
        }
        b'b' => Value::Bin(Bin::new(payload).map_err(to_parse)?),
        b'y' => Value::Symbol(Symbol::new(payload).map_err(to_parse)?),
        b'x' if payload.is_empty() => Value::Remove,
        b'x' => {
            let (type_name, val) = payload.split_once(':').ok_or_else(|| bad("xstr"))?;
            Value::XStr(XStr::new(type_name, val).map_err(to_parse)?)
        }
        _ => {
            return Err(Error::parse(
                0,
                format!("Unknown JSON type prefix {:?}", &s[..2]),
            ))
        }
    };
    Ok(val)
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            other => serializer.serialize_str(&encode_str(other)),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a Haystack JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        decode_str(v).map_err(E::custom)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl Serialize for Dict {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, val) in self {
            map.serialize_entry(name, val)?;
        }
        map.end()
    }
}

struct DictVisitor;

impl<'de> Visitor<'de> for DictVisitor {
    type Value = Dict;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of tag names to Haystack values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Dict, A::Error> {
        let mut b = DictBuilder::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((name, val)) = access.next_entry::<String, Option<Value>>()? {
            b.add_opt(name, val).map_err(de::Error::custom)?;
        }
        Ok(b.into_dict())
    }
}

impl<'de> Deserialize<'de> for Dict {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(DictVisitor)
    }
}

impl Serialize for Grid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        grid_to_json(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        grid_from_json(&json).map_err(de::Error::custom)
    }
}
