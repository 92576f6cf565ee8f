use serde::Serialize;
use std::{fmt, str::FromStr};

/// How a field is presented in the entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "options")]
pub enum FieldInput {
    Text,
    TextArea,
    Select(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub input: FieldInput,
    /// Initial draft value; empty for almost every field.
    pub default: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CategorySchema {
    pub slug: &'static str,
    pub storage_key: &'static str,
    pub header: &'static str,
    pub fields: &'static [FieldSpec],
}

impl CategorySchema {
    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// First key that is not part of this schema, if any.
    pub fn unknown_key<'a>(&self, mut keys: impl Iterator<Item = &'a str>) -> Option<&'a str> {
        keys.find(|key| self.field(key).is_none())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Careers,
    Communities,
    Projects,
    Overseas,
    Educations,
    Awards,
    Languages,
    ForeignLanguages,
    Certifications,
    ItSkills,
}

impl Category {
    /// Export and page order.
    pub const ALL: [Category; 10] = [
        Category::Careers,
        Category::Communities,
        Category::Projects,
        Category::Overseas,
        Category::Educations,
        Category::Awards,
        Category::Languages,
        Category::ForeignLanguages,
        Category::Certifications,
        Category::ItSkills,
    ];

    pub fn schema(self) -> &'static CategorySchema {
        match self {
            Category::Careers => &CAREERS,
            Category::Communities => &COMMUNITIES,
            Category::Projects => &PROJECTS,
            Category::Overseas => &OVERSEAS,
            Category::Educations => &EDUCATIONS,
            Category::Awards => &AWARDS,
            Category::Languages => &LANGUAGES,
            Category::ForeignLanguages => &FOREIGN_LANGUAGES,
            Category::Certifications => &CERTIFICATIONS,
            Category::ItSkills => &IT_SKILLS,
        }
    }

    pub fn slug(self) -> &'static str {
        self.schema().slug
    }

    pub fn header(self) -> &'static str {
        self.schema().header
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.slug() == value)
            .ok_or_else(|| UnknownCategory(value.to_string()))
    }
}

const LANGUAGE_OPTIONS: &[&str] = &["영어", "일본어", "중국어", "독일어", "프랑스어", "스페인어"];

const fn text(key: &'static str, label: &'static str, placeholder: &'static str) -> FieldSpec {
    FieldSpec {
        key,
        label,
        placeholder,
        input: FieldInput::Text,
        default: "",
    }
}

const fn area(key: &'static str, label: &'static str, placeholder: &'static str) -> FieldSpec {
    FieldSpec {
        key,
        label,
        placeholder,
        input: FieldInput::TextArea,
        default: "",
    }
}

const fn select(
    key: &'static str,
    label: &'static str,
    placeholder: &'static str,
    options: &'static [&'static str],
) -> FieldSpec {
    FieldSpec {
        key,
        label,
        placeholder,
        input: FieldInput::Select(options),
        default: "",
    }
}

static CAREERS: CategorySchema = CategorySchema {
    slug: "careers",
    storage_key: "careers",
    header: "주요경력",
    fields: &[
        text("company", "회사", "회사명을 입력하세요"),
        text("period", "기간", "2022.11~2023.12"),
        text("department", "근무부서", "근무부서를 입력하세요"),
        select("employmentType", "고용형태", "고용형태 선택", &["정규직", "계약직", "인턴", "프리랜서"]),
        text("position", "직위", "직위를 입력하세요"),
        area("responsibilities", "담당업무", "담당업무를 상세히 입력하세요"),
        text("salary", "연봉", "연봉을 입력하세요"),
        text("resignationReason", "퇴직사유", "퇴직사유를 입력하세요"),
    ],
};

static COMMUNITIES: CategorySchema = CategorySchema {
    slug: "communities",
    storage_key: "communities",
    header: "커뮤니티 활동",
    fields: &[
        text("category", "구분", "동아리, 봉사활동, 스터디 등"),
        text("activityName", "활동명", "활동명을 입력하세요"),
        text("period", "활동기간", "2022.03~2023.02"),
        area("mainActivities", "주요활동내용", "주요활동내용을 상세히 입력하세요"),
    ],
};

static PROJECTS: CategorySchema = CategorySchema {
    slug: "projects",
    storage_key: "projects",
    header: "프로젝트",
    fields: &[
        text("projectName", "프로젝트명", "프로젝트명을 입력하세요"),
        text("company", "회사명", "회사명을 입력하세요"),
        text("participationPeriod", "참여기간", "2022.03~2022.12"),
        area("responsibilities", "담당업무 및 내용", "담당업무 및 내용을 상세히 입력하세요"),
    ],
};

static OVERSEAS: CategorySchema = CategorySchema {
    slug: "overseas",
    storage_key: "overseas",
    header: "해외연수",
    fields: &[
        text("purpose", "거주목적", "유학, 연수, 근무 등"),
        text("country", "국가", "국가명을 입력하세요"),
        text("period", "거주기간", "2021.03~2022.02"),
        text("institution", "기관", "기관명을 입력하세요"),
        area("experience", "해외경험", "해외경험을 상세히 입력하세요"),
    ],
};

static EDUCATIONS: CategorySchema = CategorySchema {
    slug: "educations",
    storage_key: "educations",
    header: "교육이력",
    fields: &[
        text("courseName", "교육과정명", "교육과정명을 입력하세요"),
        text("period", "교육기간", "2023.01~2023.03"),
        select("completionStatus", "수료구분", "수료구분 선택", &["수료", "이수", "중도포기"]),
        text("institution", "교육기관", "교육기관을 입력하세요"),
        text("hours", "교육시간", "40시간"),
        area("mainContent", "주요내용", "교육의 주요내용을 입력하세요"),
    ],
};

static AWARDS: CategorySchema = CategorySchema {
    slug: "awards",
    storage_key: "awards",
    header: "수상경력",
    fields: &[
        text("awardName", "수상명", "수상명을 입력하세요"),
        text("date", "수상일", "2023.05.01"),
        text("organization", "수상기관(단체)", "수상기관을 입력하세요"),
        area("details", "수상내역", "수상내역을 상세히 입력하세요"),
    ],
};

static LANGUAGES: CategorySchema = CategorySchema {
    slug: "languages",
    storage_key: "languages",
    header: "어학능력",
    fields: &[
        FieldSpec {
            key: "language",
            label: "언어",
            placeholder: "언어 선택",
            input: FieldInput::Select(LANGUAGE_OPTIONS),
            default: "영어",
        },
        text("test", "시험", "TOEIC, OPIc, TOEFL 등"),
        text("grade", "어학등급", "IM3, AL 등"),
        text("score", "취득점수", "점수를 입력하세요"),
        text("registrationNumber", "등록(자격)번호", "등록번호를 입력하세요"),
        text("date", "취득일", "2023.05.01"),
    ],
};

static FOREIGN_LANGUAGES: CategorySchema = CategorySchema {
    slug: "foreign-languages",
    storage_key: "foreignLanguages",
    header: "외국어활용능력",
    fields: &[
        select("language", "언어", "언어 선택", LANGUAGE_OPTIONS),
        select("level", "수준", "수준 선택", &["상", "중", "하", "원어민"]),
        area("ability", "활용능력", "활용능력을 상세히 입력하세요"),
    ],
};

static CERTIFICATIONS: CategorySchema = CategorySchema {
    slug: "certifications",
    storage_key: "certifications",
    header: "자격증",
    fields: &[
        text("type", "자격종류", "정보처리기사, 컴활1급 등"),
        text("grade", "자격등급", "1급, 2급, 기사 등"),
        text("acquisitionDate", "취득일자", "2023.05.01"),
        text("registrationNumber", "등록(자격)번호", "등록번호를 입력하세요"),
        text("issuingOrganization", "발급기관", "발급기관을 입력하세요"),
    ],
};

static IT_SKILLS: CategorySchema = CategorySchema {
    slug: "it-skills",
    storage_key: "itSkills",
    header: "IT활용능력",
    fields: &[
        text("type", "IT활용종류", "Java, Python, React 등"),
        select("level", "수준", "수준 선택", &["상", "중", "하", "전문가"]),
        area("ability", "활용능력", "활용능력을 상세히 입력하세요"),
        select("proficiency", "정도", "정도 선택", &["초급", "중급", "고급", "전문가"]),
        text("usagePeriod", "사용기간", "3년, 1년 6개월 등"),
    ],
};
