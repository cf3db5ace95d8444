//! Frame-level codec tests through the public API.

mod common;

use bytes::Bytes;
use common::{fixture_date, message_id};
use lsnmpvs::iid::{Iid, TableIndex};
use lsnmpvs::timestamp::{Timestamp, UptimeStamp};
use lsnmpvs::wire::{Decoder, EncodeBuf, MAGIC};
use lsnmpvs::{DecodeErrorKind, Error, IidErrorKind, Message, MessageId, MessageType, RawIid, Value, iid};

/// Build a frame field by field.
fn frame(fields: &[&[u8]]) -> Vec<u8> {
    let mut buf = EncodeBuf::new();
    for field in fields {
        buf.push_field(field);
    }
    buf.finish().to_vec()
}

const DATE: [&[u8]; 9] = [
    b"T", b"7", b"07", b"06", b"2025", b"12", b"00", b"00", b"000",
];
const UPTIME: [&[u8]; 7] = [b"T", b"5", b"1", b"02", b"03", b"04", b"005"];

fn request_frame(msg_type: &[u8], tail: &[&[u8]]) -> Vec<u8> {
    let mut fields: Vec<&[u8]> = vec![MAGIC, msg_type];
    fields.extend_from_slice(&DATE);
    fields.push(b"ABCDEFGHIJKLMNOP");
    fields.extend_from_slice(tail);
    frame(&fields)
}

fn code(data: &[u8]) -> u32 {
    Message::decode(data).unwrap_err().code()
}

// =============================================================================
// Whole messages
// =============================================================================

#[test]
fn set_request_decodes() {
    let data = request_frame(
        b"S",
        &[
            b"2", b"D", b"2", b"1", b"3", b"D", b"3", b"3", b"3", b"1", // iids
            b"2", b"I", b"1", b"45", b"S", b"1", b"on", // values
            b"0", // errors
        ],
    );
    let msg = Message::decode(&data).unwrap();
    assert_eq!(msg.msg_type, MessageType::Set);
    assert_eq!(msg.message_id.as_str(), "ABCDEFGHIJKLMNOP");
    assert_eq!(msg.timestamp, Timestamp::Date(fixture_date()));
    assert_eq!(msg.iids, vec![iid![1, 3], iid![3, 3, 1]]);
    assert_eq!(msg.values, vec![Value::Integer(45), Value::from("on")]);
    assert!(msg.errors.is_empty());

    assert_eq!(&msg.encode().unwrap()[..], &data[..]);
}

#[test]
fn response_with_every_value_kind() {
    let msg = Message::response(
        message_id(1),
        UptimeStamp {
            days: 1,
            hours: 2,
            minutes: 3,
            seconds: 4,
            milliseconds: 5,
        },
        vec![iid![1, 1], iid![1, 6], iid![1, 7], iid![9, 9]],
        vec![
            Value::from("greenhouse-1"),
            Value::from(fixture_date()),
            Value::from(UptimeStamp::default()),
            Value::Integer(0),
        ],
        vec![0, 0, 0, 5],
    );
    let bytes = msg.encode().unwrap();
    assert_eq!(Message::decode_bytes(bytes).unwrap(), msg);
}

#[test]
fn response_uptime_wire_form() {
    let mut fields: Vec<&[u8]> = vec![MAGIC, b"R"];
    fields.extend_from_slice(&UPTIME);
    fields.extend_from_slice(&[b"ABCDEFGHIJKLMNOP", b"0", b"0", b"1", b"2"]);
    let msg = Message::decode(&frame(&fields)).unwrap();
    assert_eq!(
        msg.timestamp,
        Timestamp::Uptime(UptimeStamp {
            days: 1,
            hours: 2,
            minutes: 3,
            seconds: 4,
            milliseconds: 5,
        })
    );
    assert_eq!(msg.errors, vec![2]);
}

#[test]
fn invalid_message_id_sentinel_round_trips() {
    let msg = Message::response(MessageId::INVALID, UptimeStamp::default(), vec![], vec![], vec![1]);
    let decoded = Message::decode_bytes(msg.encode().unwrap()).unwrap();
    assert_eq!(decoded.message_id.as_str(), "INVALIDMESSAGEID");
}

// =============================================================================
// Decode failures, in rule order
// =============================================================================

#[test]
fn missing_tag() {
    assert_eq!(code(b""), 2);
    assert_eq!(code(b"hello\0G\0"), 2);
    let mut data = request_frame(b"G", &[b"0", b"0", b"0"]);
    data[0] = b'K';
    assert_eq!(code(&data), 2);
}

#[test]
fn unknown_type() {
    assert_eq!(code(&request_frame(b"Q", &[b"0", b"0", b"0"])), 3);
    assert_eq!(code(&request_frame(b"GG", &[b"0", b"0", b"0"])), 3);
    // the type is checked before anything after it
    assert_eq!(code(&frame(&[MAGIC, b"X", b"junk"])), 3);
}

#[test]
fn request_needs_date_timestamp() {
    let mut fields: Vec<&[u8]> = vec![MAGIC, b"G"];
    fields.extend_from_slice(&UPTIME);
    fields.extend_from_slice(&[b"ABCDEFGHIJKLMNOP", b"0", b"0", b"0"]);
    let err = Message::decode(&frame(&fields)).unwrap_err();
    assert!(matches!(
        &*err,
        Error::Decoding {
            kind: DecodeErrorKind::TimestampParts {
                expected: 7,
                actual: 5
            },
            ..
        }
    ));
}

#[test]
fn impossible_request_date() {
    let data = frame(&[
        MAGIC,
        b"G",
        b"T",
        b"7",
        b"31",
        b"04",
        b"2025",
        b"12",
        b"00",
        b"00",
        b"000",
        b"ABCDEFGHIJKLMNOP",
        b"0",
        b"0",
        b"0",
    ]);
    assert_eq!(code(&data), 1);
}

#[test]
fn message_id_must_be_sixteen_chars() {
    let mut fields: Vec<&[u8]> = vec![MAGIC, b"G"];
    fields.extend_from_slice(&DATE);
    fields.extend_from_slice(&[b"ABCDEFGHIJKLMNOPQ", b"0", b"0", b"0"]);
    assert_eq!(code(&frame(&fields)), 1);
}

#[test]
fn iid_shape_is_enforced_on_decode() {
    let data = request_frame(b"G", &[b"1", b"D", b"5", b"1", b"1", b"1", b"1", b"1", b"0", b"0"]);
    let err = Message::decode(&data).unwrap_err();
    assert!(matches!(
        &*err,
        Error::InvalidIid {
            kind: IidErrorKind::Shape { len: 5 }
        }
    ));
}

#[test]
fn get_carries_no_values() {
    let data = request_frame(b"G", &[b"0", b"1", b"I", b"1", b"1", b"0"]);
    assert_eq!(code(&data), 1);
}

#[test]
fn set_value_count_must_match() {
    let data = request_frame(b"S", &[b"1", b"D", b"2", b"1", b"3", b"0", b"0"]);
    let err = Message::decode(&data).unwrap_err();
    assert!(matches!(&*err, Error::IidValueMismatch { iids: 1, values: 0 }));
}

#[test]
fn earliest_rule_wins() {
    // short id and a set count mismatch: the id is checked first
    let mut fields: Vec<&[u8]> = vec![MAGIC, b"S"];
    fields.extend_from_slice(&DATE);
    fields.extend_from_slice(&[b"SHORT", b"1", b"D", b"2", b"1", b"3", b"0", b"0"]);
    assert_eq!(code(&frame(&fields)), 1);

    // with a valid id the mismatch surfaces
    let data = request_frame(b"S", &[b"1", b"D", b"2", b"1", b"3", b"0", b"0"]);
    assert_eq!(code(&data), 8);
}

#[test]
fn unknown_value_tag() {
    let data = request_frame(b"S", &[b"1", b"D", b"2", b"1", b"3", b"1", b"X", b"1", b"1", b"0"]);
    assert_eq!(code(&data), 6);
}

#[test]
fn trailing_bytes() {
    let mut data = request_frame(b"G", &[b"0", b"0", b"0"]);
    data.extend_from_slice(b"extra\0");
    let err = Message::decode(&data).unwrap_err();
    assert!(matches!(
        &*err,
        Error::Decoding {
            kind: DecodeErrorKind::TrailingData { remaining: 6 },
            ..
        }
    ));
}

#[test]
fn unterminated_field() {
    let mut data = request_frame(b"G", &[b"0", b"0", b"0"]);
    data.pop();
    assert_eq!(code(&data), 1);
}

// =============================================================================
// IIDs
// =============================================================================

#[test]
fn iid_parse_shapes() {
    let iid = Iid::parse("2.1.3").unwrap();
    assert_eq!((iid.structure(), iid.object(), iid.index()), (2, 1, TableIndex::Row(3)));

    assert_eq!(Iid::parse("1.3").unwrap().index(), TableIndex::First);
    assert_eq!(Iid::parse("2.3.0").unwrap().index(), TableIndex::RowCount);
    assert_eq!(Iid::parse("2.3.0.0").unwrap().index(), TableIndex::AllRows);
    assert_eq!(Iid::parse("2.3.2.5").unwrap().index(), TableIndex::Range(2, 5));
}

#[test]
fn iid_parse_errors() {
    let kind = |s: &str| match *Iid::parse(s).unwrap_err() {
        Error::InvalidIid { kind } => kind,
        ref other => panic!("{s}: unexpected error {other}"),
    };
    assert_eq!(kind("2"), IidErrorKind::Shape { len: 1 });
    assert_eq!(kind("1.2.3.4.5"), IidErrorKind::Shape { len: 5 });
    assert_eq!(kind("0.1"), IidErrorKind::Structure(0));
    assert_eq!(kind("-1.1"), IidErrorKind::Structure(-1));
    assert_eq!(kind("1.-2"), IidErrorKind::Object(-2));
    assert_eq!(kind("1.a"), IidErrorKind::NonInteger);
    assert_eq!(kind("2.3.-1"), IidErrorKind::NegativeIndex(-1));
}

#[test]
fn raw_iid_display_round_trips() {
    let raw: RawIid = "3.3.1".parse().unwrap();
    assert_eq!(raw.to_string(), "3.3.1");
    assert_eq!(raw, iid![3, 3, 1]);
    assert_eq!(Iid::try_from(&raw).unwrap().to_raw(), raw);
}

// =============================================================================
// Field layer
// =============================================================================

#[test]
fn decoder_walks_fields() {
    let mut decoder = Decoder::new(Bytes::from_static(b"D\x002\x00-4\x00"));
    decoder.expect_tag(b'D').unwrap();
    assert_eq!(decoder.read_count().unwrap(), 2);
    assert_eq!(decoder.read_signed().unwrap(), -4);
    assert!(decoder.is_empty());
    assert_eq!(decoder.read_field().unwrap_err().code(), 1);
}
