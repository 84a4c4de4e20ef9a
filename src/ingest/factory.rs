// src/ingest/factory.rs
//! Adapter construction, keyed on the configured provider type. A missing or
//! malformed provider identifier skips the company with a warning, never
//! fatally for the pass.

use crate::ingest::providers::{
    ashby::AshbyAdapter, custom::CustomAdapter, greenhouse::GreenhouseAdapter,
    lever::LeverAdapter, smartrecruiters::SmartRecruitersAdapter, workday::WorkdayAdapter,
};
use crate::ingest::types::{Company, JobAdapter, ProviderKind};

fn required_id(company: &Company) -> Option<String> {
    match company.provider_id.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            tracing::warn!(
                company = %company.name,
                provider = company.provider.as_str(),
                "missing provider_id; company skipped"
            );
            None
        }
    }
}

pub fn build_adapter(
    company: &Company,
    http: &reqwest::Client,
) -> Option<Box<dyn JobAdapter>> {
    match company.provider {
        ProviderKind::Greenhouse => Some(Box::new(GreenhouseAdapter::new(
            &company.name,
            required_id(company)?,
            http.clone(),
        ))),
        ProviderKind::Lever => Some(Box::new(LeverAdapter::new(
            &company.name,
            required_id(company)?,
            http.clone(),
        ))),
        ProviderKind::Workday => {
            let raw = required_id(company)?;
            // Workday needs two identifiers, packed as "tenant/site".
            let (tenant, site) = match raw.split_once('/') {
                Some((t, s)) if !t.is_empty() && !s.is_empty() => (t.to_string(), s.to_string()),
                _ => {
                    tracing::warn!(
                        company = %company.name,
                        provider = "workday",
                        provider_id = %raw,
                        "expected tenant/site; company skipped"
                    );
                    return None;
                }
            };
            Some(Box::new(WorkdayAdapter::new(
                &company.name,
                &company.careers_url,
                tenant,
                site,
                http.clone(),
            )))
        }
        ProviderKind::Ashby => Some(Box::new(AshbyAdapter::new(
            &company.name,
            required_id(company)?,
            http.clone(),
        ))),
        ProviderKind::SmartRecruiters => Some(Box::new(SmartRecruitersAdapter::new(
            &company.name,
            required_id(company)?,
            http.clone(),
        ))),
        // Custom boards get the no-op adapter; the aggregator filters them
        // out before construction anyway.
        ProviderKind::Custom => Some(Box::new(CustomAdapter::new(&company.name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(provider: ProviderKind, provider_id: Option<&str>) -> Company {
        Company {
            name: "Acme".into(),
            careers_url: "https://acme.wd1.myworkdayjobs.com/External".into(),
            provider,
            provider_id: provider_id.map(str::to_string),
            active: true,
        }
    }

    #[test]
    fn missing_identifier_skips_company() {
        let http = reqwest::Client::new();
        assert!(build_adapter(&company(ProviderKind::Greenhouse, None), &http).is_none());
        assert!(build_adapter(&company(ProviderKind::Lever, Some("  ")), &http).is_none());
    }

    #[test]
    fn workday_requires_tenant_and_site() {
        let http = reqwest::Client::new();
        assert!(build_adapter(&company(ProviderKind::Workday, Some("acme")), &http).is_none());
        assert!(build_adapter(&company(ProviderKind::Workday, Some("acme/")), &http).is_none());
        let adapter =
            build_adapter(&company(ProviderKind::Workday, Some("acme/External")), &http).unwrap();
        assert_eq!(adapter.provider(), ProviderKind::Workday);
    }

    #[test]
    fn each_provider_kind_builds_its_variant() {
        let http = reqwest::Client::new();
        for (kind, id) in [
            (ProviderKind::Greenhouse, Some("acme")),
            (ProviderKind::Lever, Some("acme")),
            (ProviderKind::Ashby, Some("acme")),
            (ProviderKind::SmartRecruiters, Some("Acme1")),
            (ProviderKind::Custom, None),
        ] {
            let adapter = build_adapter(&company(kind, id), &http).unwrap();
            assert_eq!(adapter.provider(), kind);
            assert_eq!(adapter.company(), "Acme");
        }
    }
}
