//! The Atom request/response protocol used by Wave Enhance and Corentium Home 2.
//!
//! A request is `03 01`, a two-byte nonce and a CBOR body naming a resource
//! path. The device answers on the notify characteristic with a fixed
//! header, the echoed nonce and a CBOR body carrying the same path and the
//! payload.

pub mod request;
pub mod response;

pub use request::{AtomEncoding, AtomRequest, AtomRequestPath};
pub use response::{AtomPayload, AtomResponse, AtomValue, AtomValues, is_complete_frame};

use crate::reassembler::{Completion, NotificationReassembler};

/// A reassembler that completes once a whole response frame has arrived.
#[must_use]
pub fn reassembler() -> NotificationReassembler {
    NotificationReassembler::new(Completion::Predicate(is_complete_frame))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_response_round_trip() {
        let request = AtomRequest::new(AtomRequestPath::ConnectivityMode, None).unwrap();
        let nonce = request.nonce();

        let mut frame = response::RESPONSE_HEADER.to_vec();
        frame.extend_from_slice(&nonce);
        // the device echoes the request body with the payload appended
        let body = request.encode(AtomEncoding::Cbor).unwrap();
        frame.extend_from_slice(&body[4..]);
        frame[7 + 1] = 0xA2;
        frame.extend_from_slice(&[0x02, 0x04]);

        let r = reassembler();
        r.push(&frame[..10]);
        assert!(!r.is_complete());
        r.push(&frame[10..]);
        let message = r.message().unwrap();

        let payload = AtomResponse::new(&message, nonce, request.path())
            .parse()
            .unwrap();
        assert_eq!(
            payload,
            Some(AtomPayload::Connectivity(airthings_types::ConnectivityMode::Ble))
        );
    }
}
