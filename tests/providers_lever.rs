// tests/providers_lever.rs
use job_radar::ingest::providers::lever::parse_postings;

const FIXTURE: &str = r#"[
  {
    "id": "a1b2c3",
    "text": "Staff Platform Engineer",
    "hostedUrl": "https://jobs.lever.co/acme/a1b2c3",
    "createdAt": 1751362200000,
    "workplaceType": "remote",
    "categories": { "location": "Remote - US", "team": "Platform", "commitment": "Full-time" },
    "descriptionPlain": "Acme builds developer tools.",
    "lists": [
      {
        "text": "What you'll need",
        "content": "<li>7+ years of experience</li><li>Kubernetes and Terraform</li>"
      },
      {
        "text": "Nice to have",
        "content": "<li>Rust</li>"
      }
    ]
  },
  {
    "id": "d4e5f6",
    "text": "Account Executive",
    "hostedUrl": "https://jobs.lever.co/acme/d4e5f6",
    "categories": { "location": "New York" },
    "descriptionPlain": "Sell the product.",
    "lists": []
  }
]"#;

#[test]
fn parses_postings_into_scraped_jobs() {
    let jobs = parse_postings(FIXTURE, "Acme").expect("parse fixture");
    assert_eq!(jobs.len(), 2);

    let staff = &jobs[0];
    assert_eq!(staff.title, "Staff Platform Engineer");
    assert_eq!(staff.url, "https://jobs.lever.co/acme/a1b2c3");
    assert_eq!(staff.location, "Remote - US");
    // createdAt arrives in milliseconds.
    assert_eq!(staff.posted_at, Some(1_751_362_200));
}

#[test]
fn list_sections_fold_into_the_description() {
    let jobs = parse_postings(FIXTURE, "Acme").expect("parse fixture");
    let staff = &jobs[0];
    assert!(staff.description.contains("Acme builds developer tools"));
    assert!(staff.description.contains("Kubernetes and Terraform"));
    assert!(!staff.description.contains("<li>"));
}

#[test]
fn requirements_follow_the_section_header() {
    let jobs = parse_postings(FIXTURE, "Acme").expect("parse fixture");
    let staff = &jobs[0];
    assert!(staff.requirements.contains("7+ years of experience"));
    assert!(staff.tech_stack.contains(&"Kubernetes".to_string()));
    assert!(staff.tech_stack.contains(&"Terraform".to_string()));
    assert!(staff.tech_stack.contains(&"Rust".to_string()));
}

#[test]
fn workplace_type_sets_the_remote_flag() {
    let jobs = parse_postings(FIXTURE, "Acme").expect("parse fixture");
    assert!(jobs[0].remote);
    assert!(!jobs[1].remote);
}

#[test]
fn malformed_payload_is_an_error() {
    assert!(parse_postings(r#"{"not": "an array"}"#, "Acme").is_err());
}
