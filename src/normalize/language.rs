//! Language classification and Chinese script conversion.

use crate::domain::Language;
use std::collections::HashMap;

/// Classifies text by counting CJK ideographs against Latin letters.
/// Text with neither (digits, punctuation, empty) has no language.
pub fn classify(text: &str) -> Option<Language> {
    let chinese = text
        .chars()
        .filter(|c| ('\u{4e00}'..='\u{9fff}').contains(c))
        .count();
    let english = text.chars().filter(|c| c.is_ascii_alphabetic()).count();

    match (chinese > 0, english > 0) {
        (true, false) => Some(Language::ZhHk),
        (false, true) => Some(Language::En),
        (true, true) => Some(Language::Both),
        (false, false) => None,
    }
}

// Simplified -> Traditional pairs covering the vocabulary that shows up in
// recruitment listings. Characters outside the table pass through, so
// traditional input is a fixed point.
const S2T_PAIRS: &[(char, char)] = &[
    ('会', '會'),
    ('议', '議'),
    ('览', '覽'),
    ('贸', '貿'),
    ('东', '東'),
    ('龙', '龍'),
    ('湾', '灣'),
    ('区', '區'),
    ('业', '業'),
    ('职', '職'),
    ('场', '場'),
    ('发', '發'),
    ('国', '國'),
    ('际', '際'),
    ('团', '團'),
    ('体', '體'),
    ('劳', '勞'),
    ('处', '處'),
    ('联', '聯'),
    ('络', '絡'),
    ('资', '資'),
    ('讯', '訊'),
    ('电', '電'),
    ('话', '話'),
    ('邮', '郵'),
    ('网', '網'),
    ('页', '頁'),
    ('项', '項'),
    ('预', '預'),
    ('约', '約'),
    ('务', '務'),
    ('员', '員'),
    ('营', '營'),
    ('经', '經'),
    ('济', '濟'),
    ('广', '廣'),
    ('华', '華'),
    ('开', '開'),
    ('关', '關'),
    ('门', '門'),
    ('间', '間'),
    ('问', '問'),
    ('询', '詢'),
    ('报', '報'),
    ('时', '時'),
    ('动', '動'),
    ('办', '辦'),
    ('机', '機'),
    ('构', '構'),
    ('种', '種'),
    ('类', '類'),
    ('数', '數'),
    ('码', '碼'),
    ('铁', '鐵'),
    ('银', '銀'),
    ('钱', '錢'),
    ('简', '簡'),
    ('历', '歷'),
    ('现', '現'),
    ('实', '實'),
    ('习', '習'),
    ('训', '訓'),
    ('课', '課'),
    ('专', '專'),
    ('书', '書'),
    ('证', '證'),
    ('请', '請'),
    ('设', '設'),
    ('计', '計'),
    ('续', '續'),
    ('与', '與'),
    ('并', '並'),
    ('为', '為'),
    ('从', '從'),
    ('众', '眾'),
    ('优', '優'),
    ('势', '勢'),
    ('调', '調'),
    ('转', '轉'),
    ('输', '輸'),
    ('运', '運'),
    ('达', '達'),
    ('递', '遞'),
    ('远', '遠'),
    ('边', '邊'),
    ('这', '這'),
    ('进', '進'),
    ('连', '連'),
    ('选', '選'),
    ('见', '見'),
    ('观', '觀'),
    ('视', '視'),
    ('觉', '覺'),
    ('节', '節'),
    ('荣', '榮'),
    ('乐', '樂'),
    ('术', '術'),
    ('产', '產'),
    ('贵', '貴'),
    ('费', '費'),
    ('赛', '賽'),
    ('销', '銷'),
    ('长', '長'),
    ('师', '師'),
    ('学', '學'),
    ('应', '應'),
    ('毕', '畢'),
    ('兴', '興'),
    ('当', '當'),
    ('后', '後'),
    ('几', '幾'),
    ('个', '個'),
    ('们', '們'),
    ('来', '來'),
    ('对', '對'),
    ('态', '態'),
    ('无', '無'),
    ('满', '滿'),
    ('确', '確'),
    ('认', '認'),
    ('识', '識'),
    ('写', '寫'),
    ('读', '讀'),
    ('说', '說'),
    ('语', '語'),
    ('质', '質'),
    ('环', '環'),
    ('护', '護'),
    ('医', '醫'),
    ('药', '藥'),
    ('齐', '齊'),
    ('价', '價'),
    ('标', '標'),
    ('准', '準'),
    ('备', '備'),
    ('义', '義'),
    ('险', '險'),
    ('绩', '績'),
    ('总', '總'),
    ('组', '組'),
    ('织', '織'),
    ('级', '級'),
    ('给', '給'),
    ('红', '紅'),
    ('纪', '紀'),
    ('维', '維'),
    ('绍', '紹'),
    ('统', '統'),
    ('细', '細'),
];

/// Deterministic Simplified-to-Traditional converter. Owns its mapping
/// table; construct one per pipeline instead of sharing a global.
pub struct ScriptConverter {
    table: HashMap<char, char>,
}

impl ScriptConverter {
    pub fn new() -> Self {
        Self {
            table: S2T_PAIRS.iter().copied().collect(),
        }
    }

    /// Pure character-by-character transform. Unmapped characters pass
    /// through untouched.
    pub fn convert(&self, text: &str) -> String {
        text.chars()
            .map(|c| self.table.get(&c).copied().unwrap_or(c))
            .collect()
    }
}

impl Default for ScriptConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_chinese_only() {
        assert_eq!(classify("青年招聘會"), Some(Language::ZhHk));
    }

    #[test]
    fn test_classify_english_only() {
        assert_eq!(classify("Career Fair 2024"), Some(Language::En));
    }

    #[test]
    fn test_classify_mixed() {
        assert_eq!(classify("青年招聘會 Youth Job Fair"), Some(Language::Both));
    }

    #[test]
    fn test_classify_nothing_alphabetic() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("2024/03/15 --"), None);
    }

    #[test]
    fn test_simplified_converts_to_traditional() {
        let converter = ScriptConverter::new();
        assert_eq!(converter.convert("会议中心"), "會議中心");
        assert_eq!(converter.convert("劳工处招聘会"), "勞工處招聘會");
    }

    #[test]
    fn test_traditional_is_a_fixed_point() {
        let converter = ScriptConverter::new();
        let text = "香港會議展覽中心 青年就業博覽";
        assert_eq!(converter.convert(text), text);
        // Latin text is untouched too
        assert_eq!(converter.convert("Job Fair 2024"), "Job Fair 2024");
    }
}
