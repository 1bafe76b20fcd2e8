use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::json;

pub const UNKNOWN_PHONE_TYPE: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Child {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub hobbies: Vec<String>,
}

impl Child {
    pub fn is_unregistered(&self) -> bool {
        self.hobbies.is_empty()
    }

    pub fn to_record(&self) -> serde_json::Value {
        json!({
            "first_name": self.first_name,
            "last_name": self.last_name,
            "email": self.email,
            "hobbies": self.hobbies,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Teacher {
    pub name: String,
    pub email: String,
    pub phones: Vec<Phone>,
    pub subject: String,
}

impl Teacher {
    pub fn to_record(&self) -> serde_json::Value {
        json!({
            "name": self.name,
            "email": self.email,
            "phones": self.phones.iter().map(Phone::to_record).collect::<Vec<_>>(),
            "subject": self.subject,
        })
    }
}

/// One `type -> number` pair. Serializes as a single-entry object, e.g.
/// `{"mobile": "555-0101"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phone {
    pub kind: String,
    pub number: String,
}

impl Phone {
    pub fn to_record(&self) -> serde_json::Value {
        let mut m = serde_json::Map::new();
        m.insert(self.kind.clone(), json!(self.number));
        serde_json::Value::Object(m)
    }
}

impl Serialize for Phone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut m = serializer.serialize_map(Some(1))?;
        m.serialize_entry(&self.kind, &self.number)?;
        m.end()
    }
}

#[derive(Debug, Deserialize)]
struct TeachersXml {
    #[serde(rename = "Teacher", default)]
    teachers: Vec<TeacherXml>,
}

#[derive(Debug, Deserialize)]
struct TeacherXml {
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Email", default)]
    email: Option<String>,
    #[serde(rename = "Subject", default)]
    subject: Option<String>,
    #[serde(rename = "Phone", default)]
    phones: Vec<PhoneXml>,
}

#[derive(Debug, Deserialize)]
struct PhoneXml {
    #[serde(rename = "@type", default)]
    kind: Option<String>,
    #[serde(rename = "$text", default)]
    number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChildrenXml {
    #[serde(rename = "Child", default)]
    children: Vec<ChildXml>,
}

#[derive(Debug, Deserialize)]
struct ChildXml {
    #[serde(rename = "PersonDetails", default)]
    person: PersonDetailsXml,
    #[serde(rename = "Hobby", default)]
    hobbies: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PersonDetailsXml {
    #[serde(rename = "Name", default)]
    name: NameXml,
    #[serde(rename = "Email", default)]
    email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NameXml {
    #[serde(rename = "First", default)]
    first: Option<String>,
    #[serde(rename = "Last", default)]
    last: Option<String>,
}

fn text(v: Option<String>) -> String {
    v.map(|s| s.trim().to_string()).unwrap_or_default()
}

pub fn parse_teachers_xml(body: &str) -> Result<Vec<Teacher>, quick_xml::DeError> {
    let doc: TeachersXml = quick_xml::de::from_str(body)?;
    Ok(doc
        .teachers
        .into_iter()
        .map(|t| Teacher {
            name: text(t.name),
            email: text(t.email),
            subject: text(t.subject),
            phones: t
                .phones
                .into_iter()
                .map(|p| Phone {
                    kind: p
                        .kind
                        .map(|k| k.trim().to_string())
                        .filter(|k| !k.is_empty())
                        .unwrap_or_else(|| UNKNOWN_PHONE_TYPE.to_string()),
                    number: text(p.number),
                })
                .collect(),
        })
        .collect())
}

pub fn parse_children_xml(body: &str) -> Result<Vec<Child>, quick_xml::DeError> {
    let doc: ChildrenXml = quick_xml::de::from_str(body)?;
    Ok(doc
        .children
        .into_iter()
        .map(|c| Child {
            first_name: text(c.person.name.first),
            last_name: text(c.person.name.last),
            email: text(c.person.email),
            // Empty <Hobby/> elements carry no subject.
            hobbies: c
                .hobbies
                .into_iter()
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .collect(),
        })
        .collect())
}
