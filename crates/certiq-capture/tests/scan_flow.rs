// SPDX-License-Identifier: MIT OR Apache-2.0
//
// End-to-end verification flow: issue a certificate, render its QR code,
// scan it back through a capture session, and check the decoded token
// against the registry.

use certiq_capture::{ScanOutcome, ScanSession, UnavailableCamera};
use certiq_capture::source::ReplaySource;
use certiq_codec::{ChannelOrder, PixelBuffer, QrEncoder};
use certiq_core::error::CertiqError;
use certiq_core::human_errors::{Severity, humanize_error};
use certiq_core::types::{CertificateDraft, CertificateStatus};
use certiq_issuer::{AlwaysPermitted, Issuer};
use certiq_registry::{MemoryStore, RecordStore, Verification, Verifier};

fn jane_doe() -> CertificateDraft {
    CertificateDraft {
        full_name: "Jane Doe".to_owned(),
        email: "jane.doe@example.com".to_owned(),
        completion_date: None,
        certificate_title: "Professional Certificate in Data Analytics".to_owned(),
        program: "Professional Data Analytics".to_owned(),
        template: Default::default(),
    }
}

#[test]
fn issue_encode_scan_verify_round_trip() {
    let store = MemoryStore::new();
    let issuer = Issuer::new(&store, &AlwaysPermitted);
    let record = issuer.issue(&jane_doe()).expect("issuance failed");

    let artifact = QrEncoder::new().encode(&record.id).expect("encode failed");

    // Simulate a camera: two aiming frames with nothing in them, then an
    // RGB frame carrying the code.
    let luma = artifact.pixels();
    let rgb: Vec<u8> = luma.data().iter().flat_map(|&v| [v, v, v]).collect();
    let camera_frame =
        PixelBuffer::new(luma.width(), luma.height(), ChannelOrder::Rgb8, rgb).unwrap();
    let source = ReplaySource::new([
        PixelBuffer::blank(160, 160),
        PixelBuffer::blank(160, 160),
        camera_frame,
    ]);
    let probe = source.probe();

    let mut session = ScanSession::new(source);
    let outcome = session.run().expect("scan session failed");
    let payload = match outcome {
        ScanOutcome::Found(payload) => payload,
        other => panic!("expected a decoded payload, got {other:?}"),
    };
    assert_eq!(payload, record.id.as_str());
    assert!(probe.is_closed(), "camera released after the scan");

    let verifier = Verifier::new(&store);
    let verification = verifier.verify(&payload).expect("verification failed");
    assert!(verification.is_valid());
    match verification {
        Verification::Match { record: matched, .. } => {
            assert_eq!(matched.recipient_name, "Jane Doe");
            assert_eq!(matched.status, CertificateStatus::Issued);
        }
        other => panic!("expected a registry match, got {other:?}"),
    }
}

#[test]
fn scanning_an_unissued_code_is_an_unknown_token() {
    let store = MemoryStore::new();

    // A well-formed token that was never persisted anywhere.
    let stray = certiq_core::token::Token::mint(1_700_000_000_000, &[5, 4, 3, 2, 1, 0]);
    let artifact = QrEncoder::new().encode(&stray).expect("encode failed");

    let mut session = ScanSession::new(ReplaySource::single(artifact.pixels().clone()));
    let outcome = session.run().expect("scan session failed");
    let payload = match outcome {
        ScanOutcome::Found(payload) => payload,
        other => panic!("expected a decoded payload, got {other:?}"),
    };

    let verification = Verifier::new(&store).verify(&payload).unwrap();
    assert!(matches!(verification, Verification::Unknown { .. }));
    assert!(!verification.is_valid());
}

#[test]
fn revoked_certificate_fails_verification_after_scan() {
    let store = MemoryStore::new();
    let issuer = Issuer::new(&store, &AlwaysPermitted);
    let record = issuer.issue(&jane_doe()).unwrap();
    assert!(store.update_status(&record.id, CertificateStatus::Revoked).unwrap());

    let artifact = QrEncoder::new().encode(&record.id).unwrap();
    let mut session = ScanSession::new(ReplaySource::single(artifact.pixels().clone()));
    let payload = match session.run().unwrap() {
        ScanOutcome::Found(payload) => payload,
        other => panic!("expected a decoded payload, got {other:?}"),
    };

    let verification = Verifier::new(&store).verify(&payload).unwrap();
    assert!(matches!(verification, Verification::Match { .. }));
    assert!(!verification.is_valid(), "revoked certificates are not valid");
}

#[test]
fn missing_device_surfaces_an_actionable_error_without_leaking() {
    let source = UnavailableCamera::default();
    let probe = source.probe();

    let mut session = ScanSession::new(source);
    let err = session.run().unwrap_err();
    assert!(matches!(err, CertiqError::Device(_)));
    assert!(probe.is_closed(), "no resource may stay held on failure");

    let human = humanize_error(&err);
    assert_eq!(human.severity, Severity::ActionRequired);
    assert!(!human.message.is_empty());
}
