//! Defines the content store: the [`Newsletter`] and [`Resource`] records the
//! site lists, plus the copy for the home page. The store is created once at
//! startup, either from the built-in list ([`ContentStore::builtin`]) or from a
//! project's `content.yaml` ([`ContentStore::from_yaml_file`]), and is never
//! mutated afterwards.

use crate::tag::Tag;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A single newsletter issue.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Newsletter {
    pub id: String,
    pub title: String,

    /// A short abstract of the issue. May contain inline Markdown.
    pub summary: String,

    #[serde(default)]
    pub tags: Vec<Tag>,

    pub date: NaiveDate,

    /// The path of the card image, passed through to the page unchanged.
    pub image: String,

    /// The outbound link to the full issue.
    pub link: String,
}

/// A resource hub entry: a titled list of bullet points with optional links
/// to open or download the material.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Resource {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub points: Vec<String>,
    #[serde(default)]
    pub open_link: Option<String>,
    #[serde(default)]
    pub download_link: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Card {
    pub title: String,
    pub text: String,
    pub image: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FocusArea {
    pub title: String,
    pub text: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BulletCard {
    pub title: String,
    pub points: Vec<String>,
}

/// An entry in the "What's ahead" timeline.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Milestone {
    pub when: String,
    pub title: String,
    pub detail: String,
}

/// The copy for the home page.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Home {
    pub eyebrow: String,
    pub headline: String,
    pub lede: String,
    pub hero_image: String,
    pub hero_art: String,
    pub cards: Vec<Card>,
    pub focus_areas: Vec<FocusArea>,
    pub methods: Vec<BulletCard>,
    pub partnerships: Vec<String>,
    pub contact: String,
    pub timeline: Vec<Milestone>,
}

/// The immutable collections of records the site is built from.
#[derive(Clone, Debug)]
pub struct ContentStore {
    newsletters: Vec<Newsletter>,
    resources: Vec<Resource>,
    home: Home,
}

#[derive(Deserialize)]
struct ContentFile {
    #[serde(default)]
    newsletters: Vec<Newsletter>,
    #[serde(default)]
    resources: Vec<Resource>,
    home: Option<Home>,
}

impl ContentStore {
    /// Creates a store from its collections. Fails with
    /// [`Error::DuplicateId`] if any id appears twice across newsletters and
    /// resources combined.
    pub fn new(
        newsletters: Vec<Newsletter>,
        resources: Vec<Resource>,
        home: Home,
    ) -> Result<ContentStore> {
        let mut seen: HashSet<&str> = HashSet::new();
        let ids = newsletters
            .iter()
            .map(|n| n.id.as_str())
            .chain(resources.iter().map(|r| r.id.as_str()));
        for id in ids {
            if !seen.insert(id) {
                return Err(Error::DuplicateId(id.to_owned()));
            }
        }
        Ok(ContentStore {
            newsletters,
            resources,
            home,
        })
    }

    /// Loads a store from a YAML content file. A file without a `home`
    /// section falls back to the built-in home page copy.
    pub fn from_yaml_file(path: &Path) -> Result<ContentStore> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let content: ContentFile =
            serde_yaml::from_reader(file).map_err(|err| Error::Parse {
                path: path.to_owned(),
                err,
            })?;
        ContentStore::new(
            content.newsletters,
            content.resources,
            content.home.unwrap_or_else(builtin_home),
        )
    }

    /// The content the site ships with.
    pub fn builtin() -> ContentStore {
        ContentStore {
            newsletters: builtin_newsletters(),
            resources: builtin_resources(),
            home: builtin_home(),
        }
    }

    pub fn newsletters(&self) -> &[Newsletter] {
        &self.newsletters
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn home(&self) -> &Home {
        &self.home
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("literal content dates are valid")
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

fn builtin_newsletters() -> Vec<Newsletter> {
    let newsletter = |id: &str,
                      title: &str,
                      summary: &str,
                      tags: &[&str],
                      date: NaiveDate,
                      image: &str| Newsletter {
        id: id.to_owned(),
        title: title.to_owned(),
        summary: summary.to_owned(),
        tags: tags.iter().map(|t| Tag::new(t)).collect(),
        date,
        image: image.to_owned(),
        link: format!("https://responsibleaibeyond.org/issues/{}", id),
    };

    vec![
        newsletter(
            "au-continental-ai-strategy",
            "How Governments Are Adopting the AU Continental AI Strategy (2024–2025)",
            "A roundup of national AI strategy updates across Africa, tracking readiness, funding, and implementation gaps.",
            &["Policy", "Africa", "Strategy"],
            date(2025, 9, 28),
            "/images/brief.png",
        ),
        newsletter(
            "model-evaluations-101",
            "Model Evaluations 101: From Red-Team Drills to Societal Impact Checks",
            "Explains capability, safety, and socio-technical evals with a lightweight checklist teams can start using today.",
            &["Safety", "Evaluation", "Governance"],
            date(2025, 8, 19),
            "/images/playbook.png",
        ),
        newsletter(
            "localization-agri-llms",
            "Inclusive by Design: Localization Tactics for Low-Power Agri-LLMs",
            "Concrete practices for building localized assistants that work for small-scale producers and rural contexts.",
            &["Inclusion", "Localization", "Agriculture"],
            date(2025, 7, 12),
            "/images/case.png",
        ),
        newsletter(
            "dpi-angle",
            "The DPI Angle: Interoperability, Open Standards, and Accountability",
            "Why digital public infrastructure matters for scalable, responsible AI systems in the public sector.",
            &["DPI", "Open Standards", "Accountability"],
            date(2025, 6, 30),
            "/images/brief.png",
        ),
        newsletter(
            "weekly-brief-37",
            "Weekly Brief #37: AI Safety Updates & African Policy Watch",
            "A concise digest covering governance, safety incidents, and inclusive AI practices you can apply this week.",
            &["Weekly Brief", "Safety", "Policy"],
            date(2025, 6, 2),
            "/images/brief.png",
        ),
    ]
}

fn builtin_resources() -> Vec<Resource> {
    let resource = |id: &str, title: &str, points: &[&str], download: bool| Resource {
        id: id.to_owned(),
        title: title.to_owned(),
        points: strings(points),
        open_link: Some(format!("https://responsibleaibeyond.org/resources/{}", id)),
        download_link: match download {
            true => Some(format!(
                "https://responsibleaibeyond.org/resources/{}.pdf",
                id
            )),
            false => None,
        },
    };

    vec![
        resource(
            "ai-governance-101",
            "AI Governance 101",
            &[
                "Explainers on major frameworks (AU, OECD, NIST)",
                "Sample policies (usage, procurement, incident response)",
                "Glossary: from access controls to watermarking",
            ],
            false,
        ),
        resource(
            "safety-and-evaluations",
            "Safety & Evaluations",
            &[
                "Red‑team patterns and reporting",
                "Human oversight & HIRAs",
                "System cards, documentation, and audits",
            ],
            false,
        ),
        resource(
            "inclusion-and-localization",
            "Inclusion & Localization",
            &[
                "Language, literacy, and cultural fit",
                "Low‑power deployment patterns",
                "Community feedback and participatory design",
            ],
            false,
        ),
        resource(
            "digital-public-infrastructure",
            "Digital Public Infrastructure",
            &[
                "Open standards and interoperability",
                "Registries, consent, and data governance",
                "Procurement templates and vendor questions",
            ],
            false,
        ),
        resource(
            "practical-templates",
            "Practical Templates",
            &[
                "AI Risk Review (NIST‑aligned), 4 pages",
                "Model Card + Incident Log, 2 pages",
                "Localization Readiness Worksheet, 1 page",
                "Procurement & DPI Checklist, 2 pages",
            ],
            true,
        ),
    ]
}

fn builtin_home() -> Home {
    Home {
        eyebrow: "Weekly Briefing".to_owned(),
        headline: "Responsible AI & Beyond".to_owned(),
        lede: "Clear, practical insight on AI governance, safety, and inclusion, with a special lens on Africa and other emerging ecosystems.".to_owned(),
        hero_image: "/images/hero-raib.png".to_owned(),
        hero_art: "/images/hero-art.svg".to_owned(),
        cards: vec![
            Card {
                title: "Governance & Policy".to_owned(),
                text: "Readouts of regulations, standards, and what they mean for real systems.".to_owned(),
                image: "/images/governance.png".to_owned(),
            },
            Card {
                title: "Safety & Security".to_owned(),
                text: "Evals, incidents, mitigations, and red‑teaming patterns that scale.".to_owned(),
                image: "/images/safety.png".to_owned(),
            },
            Card {
                title: "Inclusion & Access".to_owned(),
                text: "Localization, accessibility, and DPI approaches that broaden impact.".to_owned(),
                image: "/images/inclusion.png".to_owned(),
            },
        ],
        focus_areas: vec![
            FocusArea {
                title: "Policy explainers".to_owned(),
                text: "that de‑jargonize laws and standards for teams shipping products.".to_owned(),
            },
            FocusArea {
                title: "Risk management playbooks".to_owned(),
                text: "(NIST AI RMF‑aligned) adapted for resource‑constrained teams.".to_owned(),
            },
            FocusArea {
                title: "Localization blueprints".to_owned(),
                text: "for low‑power, low‑cost models in agriculture, health, and public services.".to_owned(),
            },
            FocusArea {
                title: "Procurement & DPI guides".to_owned(),
                text: "for interoperable, open, and accountable AI in government.".to_owned(),
            },
        ],
        methods: vec![
            BulletCard {
                title: "Model & System Evaluations".to_owned(),
                points: strings(&[
                    "Capabilities, hazards, and real‑world misuse modes",
                    "Human‑in‑the‑loop and red‑team drills",
                    "Societal impact checks aligned to local context",
                ]),
            },
            BulletCard {
                title: "Privacy & Safety Tooling".to_owned(),
                points: strings(&[
                    "Data minimization and consent patterns",
                    "Audit logging, provenance, and traceability",
                    "Content labeling, feedback channels, and transparency",
                ]),
            },
        ],
        partnerships: strings(&[
            "Working groups",
            "Policy roundtables",
            "Open resources",
            "Community spotlights",
        ]),
        contact: "hello@responsibleaibeyond.org".to_owned(),
        timeline: vec![
            Milestone {
                when: "Q4 2025".to_owned(),
                title: "AI Policy Roundup: Year‑end special".to_owned(),
                detail: "Comparative analysis of major global moves and what to expect in 2026.".to_owned(),
            },
            Milestone {
                when: "Q1 2026".to_owned(),
                title: "Localization Sprint: Community call".to_owned(),
                detail: "Share case studies across agri, health, and public services.".to_owned(),
            },
            Milestone {
                when: "Q2 2026".to_owned(),
                title: "Safety & Evaluations Toolkit v1".to_owned(),
                detail: "An open, lightweight kit for teams adopting basic safety workflows.".to_owned(),
            },
        ],
    }
}

/// The result of a fallible content-loading operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the content store.
#[derive(Debug)]
pub enum Error {
    /// Returned when the content file can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the content file isn't valid content YAML.
    Parse { path: PathBuf, err: serde_yaml::Error },

    /// Returned when two records share an id.
    DuplicateId(String),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening content file '{}': {}", path.display(), err)
            }
            Error::Parse { path, err } => {
                write!(f, "Parsing content file '{}': {}", path.display(), err)
            }
            Error::DuplicateId(id) => write!(f, "Duplicate content id `{}`", id),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Parse { path: _, err } => Some(err),
            Error::DuplicateId(_) => None,
        }
    }
}
