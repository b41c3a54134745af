// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for contact, testimonial and review photo handlers.

use presta_domain::{
    MAX_PHOTO_SIZE_BYTES, MAX_PHOTOS_PER_REVIEW, ModerationDecision, TestimonialStatus,
};

use crate::ApiError;
use crate::handlers::{
    list_review_photos, list_testimonials, moderate_testimonial, register_review_photo,
    submit_contact_message, submit_testimonial,
};
use crate::request_response::{
    ContactRequest, ModerateTestimonialRequest, RegisterPhotoRequest, SubmitTestimonialRequest,
};
use crate::tests::helpers::{create_admin, create_client, setup};

fn contact_request() -> ContactRequest {
    ContactRequest {
        name: String::from("Alice Martin"),
        email: String::from("alice@example.fr"),
        subject: String::from("Devis"),
        message: String::from("Bonjour, je voudrais un devis pour une fuite."),
    }
}

fn testimonial_request() -> SubmitTestimonialRequest {
    SubmitTestimonialRequest {
        author_name: String::from("Alice"),
        video_url: String::from("https://videos.example.fr/alice.mp4"),
        caption: Some(String::from("Super service")),
    }
}

fn photo_request(index: usize) -> RegisterPhotoRequest {
    RegisterPhotoRequest {
        storage_path: format!("reviews/7/photo-{index}.jpg"),
        content_type: String::from("image/jpeg"),
        size_bytes: 120_000,
    }
}

#[test]
fn test_contact_message_is_stored() {
    let mut persistence = setup();

    let response = submit_contact_message(&mut persistence, &contact_request()).unwrap();

    assert!(response.success);
    assert!(response.id > 0);
    assert_eq!(persistence.count_contact_messages().unwrap(), 1);
}

#[test]
fn test_contact_message_rejects_bad_email() {
    let mut persistence = setup();
    let mut request = contact_request();
    request.email = String::from("not-an-email");

    let result = submit_contact_message(&mut persistence, &request);

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "email"
    ));
    assert_eq!(persistence.count_contact_messages().unwrap(), 0);
}

#[test]
fn test_contact_message_requires_every_field() {
    let mut persistence = setup();
    let mut request = contact_request();
    request.subject = String::from("  ");

    let result = submit_contact_message(&mut persistence, &request);

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "subject"
    ));
}

#[test]
fn test_testimonial_is_hidden_until_approved() {
    let mut persistence = setup();
    let admin = create_admin(&mut persistence);
    let client = create_client(&mut persistence, "alice");

    let submitted = submit_testimonial(&mut persistence, &client, testimonial_request()).unwrap();
    assert_eq!(submitted.status, TestimonialStatus::Pending);
    assert!(list_testimonials(&mut persistence).unwrap().is_empty());

    let approved = moderate_testimonial(
        &mut persistence,
        &admin,
        submitted.testimonial_id,
        &ModerateTestimonialRequest {
            decision: ModerationDecision::Approve,
        },
    )
    .unwrap();
    assert_eq!(approved.status, TestimonialStatus::Approved);

    let listed = list_testimonials(&mut persistence).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].testimonial_id, submitted.testimonial_id);
}

#[test]
fn test_testimonial_requires_https_video() {
    let mut persistence = setup();
    let client = create_client(&mut persistence, "alice");
    let mut request = testimonial_request();
    request.video_url = String::from("http://videos.example.fr/alice.mp4");

    let result = submit_testimonial(&mut persistence, &client, request);

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "video_url"
    ));
}

#[test]
fn test_moderated_testimonial_cannot_be_moderated_again() {
    let mut persistence = setup();
    let admin = create_admin(&mut persistence);
    let client = create_client(&mut persistence, "alice");
    let submitted = submit_testimonial(&mut persistence, &client, testimonial_request()).unwrap();
    let reject = ModerateTestimonialRequest {
        decision: ModerationDecision::Reject,
    };

    let rejected =
        moderate_testimonial(&mut persistence, &admin, submitted.testimonial_id, &reject).unwrap();
    assert_eq!(rejected.status, TestimonialStatus::Rejected);

    let again = moderate_testimonial(
        &mut persistence,
        &admin,
        submitted.testimonial_id,
        &ModerateTestimonialRequest {
            decision: ModerationDecision::Approve,
        },
    );
    assert!(matches!(
        again,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "moderate_pending_only"
    ));
    assert!(list_testimonials(&mut persistence).unwrap().is_empty());
}

#[test]
fn test_moderation_requires_admin_and_known_testimonial() {
    let mut persistence = setup();
    let admin = create_admin(&mut persistence);
    let client = create_client(&mut persistence, "alice");
    let submitted = submit_testimonial(&mut persistence, &client, testimonial_request()).unwrap();
    let approve = ModerateTestimonialRequest {
        decision: ModerationDecision::Approve,
    };

    assert!(matches!(
        moderate_testimonial(&mut persistence, &client, submitted.testimonial_id, &approve),
        Err(ApiError::Unauthorized { .. })
    ));
    assert!(matches!(
        moderate_testimonial(&mut persistence, &admin, 404, &approve),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_review_photos_capped_per_review() {
    let mut persistence = setup();
    let client = create_client(&mut persistence, "alice");
    let limit = usize::try_from(MAX_PHOTOS_PER_REVIEW).unwrap();

    for index in 0..limit {
        register_review_photo(&mut persistence, &client, 7, &photo_request(index)).unwrap();
    }
    let result = register_review_photo(&mut persistence, &client, 7, &photo_request(limit));

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "photos_per_review"
    ));
    let photos = list_review_photos(&mut persistence, 7).unwrap();
    assert_eq!(photos.len(), limit);
    assert_eq!(photos[0].storage_path, "reviews/7/photo-0.jpg");

    register_review_photo(&mut persistence, &client, 8, &photo_request(0)).unwrap();
    assert_eq!(list_review_photos(&mut persistence, 8).unwrap().len(), 1);
}

#[test]
fn test_review_photo_validation() {
    let mut persistence = setup();
    let client = create_client(&mut persistence, "alice");

    let mut gif = photo_request(0);
    gif.content_type = String::from("image/gif");
    assert!(matches!(
        register_review_photo(&mut persistence, &client, 7, &gif),
        Err(ApiError::InvalidInput { ref field, .. }) if field == "content_type"
    ));

    let mut huge = photo_request(0);
    huge.size_bytes = MAX_PHOTO_SIZE_BYTES + 1;
    assert!(matches!(
        register_review_photo(&mut persistence, &client, 7, &huge),
        Err(ApiError::InvalidInput { ref field, .. }) if field == "size_bytes"
    ));

    assert!(list_review_photos(&mut persistence, 7).unwrap().is_empty());
}
