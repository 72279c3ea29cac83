//! Property tests for the frame codec and payload streams

use proptest::prelude::*;

use sbgc_hal::LoopbackTransport;
use sbgc_protocol::codec::{encode_frame, FRAME_OVERHEAD};
use sbgc_protocol::{
    read_command, write_command, ByteSink, ByteSource, CommandBuffer, FrameParser, ProtocolError,
    RawCommand, MAX_FRAME_SIZE, PACKET_MARKER,
};

type Link = LoopbackTransport<MAX_FRAME_SIZE>;

fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=255)
}

fn framed(command_id: u8, payload: &[u8]) -> Link {
    let command = RawCommand::with_payload(command_id, payload).unwrap();
    let mut link = Link::new();
    write_command(&command, &mut link).unwrap();
    link
}

proptest! {
    #[test]
    fn roundtrip_through_transport(command_id in any::<u8>(), payload in payload_strategy()) {
        let mut link = framed(command_id, &payload);
        prop_assert_eq!(link.len(), payload.len() + FRAME_OVERHEAD);

        let mut buffer = CommandBuffer::new();
        let header = read_command(&mut link, &mut buffer).unwrap();
        prop_assert_eq!(header.command_id, command_id);
        prop_assert_eq!(header.payload_size as usize, payload.len());
        prop_assert_eq!(buffer.as_slice(), &payload[..]);
        prop_assert_eq!(buffer.position(), 0);
        prop_assert!(link.is_empty());
    }

    #[test]
    fn payload_corruption_is_detected(
        command_id in any::<u8>(),
        payload in prop::collection::vec(any::<u8>(), 1..=255),
        index in any::<prop::sample::Index>(),
        mask in 1u8..,
    ) {
        let mut link = framed(command_id, &payload);
        // Payload starts after marker, id, size and header checksum
        let offset = 4 + index.index(payload.len());
        prop_assert!(link.corrupt(offset, mask));

        let mut buffer = CommandBuffer::new();
        let result = read_command(&mut link, &mut buffer);
        let is_payload_mismatch = matches!(result, Err(ProtocolError::PayloadChecksumMismatch { .. }));
        prop_assert!(is_payload_mismatch);
        prop_assert!(buffer.is_empty());
    }

    #[test]
    fn header_corruption_is_detected(
        command_id in any::<u8>(),
        payload in payload_strategy(),
        field in 1usize..=2,
        mask in 1u8..,
    ) {
        let mut link = framed(command_id, &payload);
        prop_assert!(link.corrupt(field, mask));

        let mut buffer = CommandBuffer::new();
        let result = read_command(&mut link, &mut buffer);
        let is_header_mismatch = matches!(result, Err(ProtocolError::HeaderChecksumMismatch { .. }));
        prop_assert!(is_header_mismatch);
        // Nothing past the header was consumed
        prop_assert_eq!(link.len(), payload.len() + 1);
    }

    #[test]
    fn parser_skips_garbage(
        garbage in prop::collection::vec(any::<u8>().prop_filter("not a marker", |b| *b != PACKET_MARKER), 0..32),
        command_id in any::<u8>(),
        payload in payload_strategy(),
    ) {
        let command = RawCommand::with_payload(command_id, &payload).unwrap();
        let mut bytes = garbage.clone();
        let mut frame = [0u8; MAX_FRAME_SIZE];
        let len = encode_frame(&command, &mut frame).unwrap();
        bytes.extend_from_slice(&frame[..len]);

        let mut parser = FrameParser::new();
        let (consumed, parsed) = parser.feed_bytes(&bytes);
        prop_assert_eq!(consumed, bytes.len());
        prop_assert_eq!(parsed.unwrap(), Some(command));
    }

    #[test]
    fn numeric_fields_roundtrip(word in any::<u16>(), long in any::<u32>(), float in any::<f32>(), signed in any::<i32>()) {
        let mut buffer = CommandBuffer::new();
        buffer.write_word(word).unwrap();
        buffer.write_long(long).unwrap();
        buffer.write_float(float).unwrap();
        buffer.write_i32(signed).unwrap();
        prop_assert_eq!(buffer.len(), 2 + 4 + 4 + 4);

        prop_assert_eq!(buffer.read_word().unwrap(), word);
        prop_assert_eq!(buffer.read_long().unwrap(), long);
        prop_assert_eq!(buffer.read_float().unwrap().to_bits(), float.to_bits());
        prop_assert_eq!(buffer.read_i32().unwrap(), signed);
        prop_assert_eq!(buffer.read_byte(), Err(ProtocolError::Underrun));
    }

    #[test]
    fn strings_roundtrip(text in "[ -~]{0,200}") {
        let mut buffer = CommandBuffer::new();
        buffer.write_string(&text).unwrap();
        prop_assert_eq!(buffer.len(), text.len() + 1);

        let read = buffer.read_string().unwrap();
        prop_assert_eq!(read.as_str(), text.as_str());
    }
}
