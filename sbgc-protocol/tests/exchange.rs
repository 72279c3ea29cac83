//! Request/reply exchanges against a simulated controller

use sbgc_hal::{LoopbackTransport, TransportRx, TransportTx};
use sbgc_protocol::codec::{drain_payload, encode_frame, read_command_resync};
use sbgc_protocol::messages::{BoardInfo, BoardInfoRequest, Confirm, MotorsOn, CMD_CONFIRM};
use sbgc_protocol::{
    read_command, write_command, CommandBuffer, FrameParser, Message, ProtocolError, RawCommand,
    MAX_FRAME_SIZE,
};

type Link = LoopbackTransport<{ MAX_FRAME_SIZE * 2 }>;

/// Controller side of the link: parses host frames and queues replies
struct Controller {
    parser: FrameParser,
    info: BoardInfo,
}

impl Controller {
    fn new() -> Self {
        Self {
            parser: FrameParser::new(),
            info: BoardInfo {
                board_version: 36,
                firmware_version: 2730,
                state_flags: 0,
                board_features: 0x0001,
                connection_flag: 0,
                firmware_extra_id: 42,
            },
        }
    }

    /// Consume everything the host sent and write replies to `to_host`
    fn service(&mut self, from_host: &mut Link, to_host: &mut Link) {
        while from_host.bytes_available() > 0 {
            let byte = from_host.read_byte().unwrap();
            let Some(mut command) = self.parser.feed(byte).unwrap() else {
                continue;
            };
            let reply = match command.command_id {
                id if id == BoardInfoRequest::COMMAND_ID => {
                    BoardInfoRequest::from_command(&mut command).unwrap();
                    self.info.to_command().unwrap()
                }
                id => Confirm::of(id).to_command().unwrap(),
            };
            write_command(&reply, to_host).unwrap();
        }
    }
}

#[test]
fn board_info_exchange() {
    let mut to_controller = Link::new();
    let mut to_host = Link::new();
    let mut controller = Controller::new();

    let request = BoardInfoRequest::default().to_command().unwrap();
    write_command(&request, &mut to_controller).unwrap();
    controller.service(&mut to_controller, &mut to_host);

    assert!(to_host.bytes_available() > 0);
    let mut reply = RawCommand::read_from(&mut to_host).unwrap();
    let info = BoardInfo::from_command(&mut reply).unwrap();
    assert_eq!(info.firmware_parts(), (2, 73, 0));
    assert_eq!(info.board_version, 36);
}

#[test]
fn command_is_confirmed() {
    let mut to_controller = Link::new();
    let mut to_host = Link::new();
    let mut controller = Controller::new();

    write_command(&MotorsOn.to_command().unwrap(), &mut to_controller).unwrap();
    controller.service(&mut to_controller, &mut to_host);

    let mut reply = RawCommand::read_from(&mut to_host).unwrap();
    assert_eq!(reply.command_id, CMD_CONFIRM);
    assert!(Confirm::from_command(&mut reply).unwrap().confirms(MotorsOn::COMMAND_ID));
}

#[test]
fn host_recovers_from_line_noise() {
    let mut to_host = Link::new();
    let good = Confirm::of(b'M').to_command().unwrap();

    // Noise, a frame with a corrupted payload, then a good frame
    to_host.push_bytes(&[0x00, 0x13, 0x37]).unwrap();
    let mut frame = [0u8; MAX_FRAME_SIZE];
    let len = encode_frame(&good, &mut frame).unwrap();
    frame[4] ^= 0x01;
    to_host.push_bytes(&frame[..len]).unwrap();
    write_command(&good, &mut to_host).unwrap();

    let mut buffer = CommandBuffer::new();
    assert!(matches!(
        read_command(&mut to_host, &mut buffer),
        Err(ProtocolError::Framing { found: 0x00 })
    ));

    let mut received = None;
    let mut errors = 0;
    while to_host.bytes_available() > 0 {
        match read_command_resync(&mut to_host, &mut buffer, 16) {
            Ok(Some(header)) => {
                received = Some(header);
                break;
            }
            Ok(None) => break,
            Err(e) => {
                assert!(e.is_desync());
                errors += 1;
            }
        }
    }

    assert_eq!(errors, 1);
    let header = received.unwrap();
    assert_eq!(header.command_id, CMD_CONFIRM);
    assert_eq!(buffer.as_slice(), good.payload.as_slice());
    assert!(to_host.is_empty());
}

#[test]
fn oversized_reply_can_be_drained() {
    let mut to_host = Link::new();
    let info = Controller::new().info.to_command().unwrap();
    write_command(&info, &mut to_host).unwrap();
    write_command(&Confirm::of(b'M').to_command().unwrap(), &mut to_host).unwrap();

    let mut small = CommandBuffer::with_capacity(8);
    let pending = match read_command(&mut to_host, &mut small) {
        Err(ProtocolError::PayloadTooLarge {
            command_id,
            payload_size,
        }) => {
            assert_eq!(command_id, BoardInfo::COMMAND_ID);
            payload_size
        }
        other => panic!("unexpected result: {:?}", other),
    };
    drain_payload(&mut to_host, pending).unwrap();

    let header = read_command(&mut to_host, &mut small).unwrap();
    assert_eq!(header.command_id, CMD_CONFIRM);
}

#[test]
fn transport_failure_is_not_retried() {
    let mut tiny = LoopbackTransport::<3>::new();
    let result = write_command(&MotorsOn.to_command().unwrap(), &mut tiny);
    assert!(matches!(result, Err(ProtocolError::Transport(_))));
    assert_eq!(tiny.len(), 3);
    assert!(tiny.write_byte(0).is_err());
}
