use rand::random;
use crate::packet::Packet;

/// `tcp.ping random_id:long = tcp.Pong`
const TCP_PING: u32 = 0x4d082b9a;
/// `tcp.pong random_id:long = tcp.Pong`
const TCP_PONG: u32 = 0xdc69fb03;

pub fn ping_packet() -> Packet {
    let nonce = random::<u64>();

    Packet::new([TCP_PING.to_le_bytes().as_slice(), nonce.to_le_bytes().as_slice()].concat())
}

pub fn is_pong_packet(packet: &Packet) -> bool {
    packet.data.len() == 12 && packet.data.starts_with(&TCP_PONG.to_le_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_packet_layout() {
        let packet = ping_packet();

        assert_eq!(packet.len(), 12);
        assert_eq!(packet.data[..4], [0x9a, 0x2b, 0x08, 0x4d]);
    }

    #[test]
    fn pong_packet_detected() {
        let pong = Packet::new(vec![0x03, 0xfb, 0x69, 0xdc, 1, 2, 3, 4, 5, 6, 7, 8]);

        assert!(is_pong_packet(&pong));
        assert!(!is_pong_packet(&ping_packet()));
        assert!(!is_pong_packet(&Packet::new(vec![0x03, 0xfb, 0x69, 0xdc])));
    }
}
