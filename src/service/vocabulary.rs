use crate::models::{Category, Currency, Unit};

/// 关键词表, 启动时构建一次后共享
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub header: HeaderKeywords,
    pub name_skip_contains: Vec<String>,
    pub name_skip_equals: Vec<String>,
    /// 有序, 第一个命中的类别生效
    pub categories: Vec<(Category, Vec<String>)>,
    pub unit_aliases: Vec<(Unit, Vec<String>)>,
    pub unit_hints: Vec<(Unit, Vec<String>)>,
    pub currency_markers: Vec<(Currency, Vec<String>)>,
    pub metadata: MetadataLabels,
    /// `(正则, 标准名称)`, 不区分大小写
    pub rewrite_rules: Vec<(String, String)>,
    pub materials: MaterialKeywords,
}

#[derive(Debug, Clone)]
pub struct HeaderKeywords {
    pub name: Vec<String>,
    pub unit: Vec<String>,
    pub unit_exact: Vec<String>,
    pub quantity: Vec<String>,
    pub price: Vec<String>,
    pub price_exclude: Vec<String>,
    pub total: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MetadataLabels {
    pub address: Vec<String>,
    pub customer: Vec<String>,
    pub area: Vec<String>,
    /// 面积标签还须包含单位 (`площадь, м²`)
    pub area_unit: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MaterialKeywords {
    pub labor_only: Vec<String>,
    pub consumables: Vec<String>,
    pub material_heavy: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            header: HeaderKeywords {
                name: words(&["наименование", "название", "работ", "name", "description"]),
                unit: words(&["ед.", "единиц", "unit"]),
                unit_exact: words(&["ед", "uom"]),
                quantity: words(&["кол-во", "количеств", "объем", "объём", "qty", "quantity"]),
                price: words(&["цена", "расценка", "price", "rate"]),
                price_exclude: words(&["итого", "всего", "total"]),
                total: words(&["сумма", "итого", "всего", "стоимость", "total", "amount"]),
            },
            name_skip_contains: words(&["наименование", "№", "сумма"]),
            name_skip_equals: words(&["итого", "всего", "total", "description"]),
            categories: vec![
                (
                    Category::Preparation,
                    words(&["подготов", "заклеив", "защит", "укрыв", "пленк", "картон", "уборка", "вынос", "очистк"]),
                ),
                (
                    Category::Demolition,
                    words(&["демонтаж", "снятие", "разбор", "удален", "слом", "сбивка", "срез", "вывоз мусор"]),
                ),
                (
                    Category::Walls,
                    words(&[
                        "штукатурк", "шпаклев", "шпаклёв", "шпатлев", "грунтов стен", "стен", "обои", "обоев",
                        "покраск стен", "малярн", "гипсокартон стен", "откос", "армир сет", "маяк",
                    ]),
                ),
                (
                    Category::Floors,
                    words(&["стяжк", "наливн", "пол", "ламинат", "плинтус", "паркет", "линолеум", "порог"]),
                ),
                (
                    Category::Ceilings,
                    words(&["потолок", "потолк", "натяжн", "короб"]),
                ),
                (
                    Category::Tiling,
                    words(&["плитк", "кафел", "керамогранит", "мозаик", "затирк", "фуг"]),
                ),
                (
                    Category::Electrical,
                    words(&[
                        "электр", "розетк", "выключател", "провод", "кабел", "щит", "автомат", "точка осв",
                        "светильник", "люстр", "бра", "подсветк",
                    ]),
                ),
                (
                    Category::Plumbing,
                    words(&[
                        "сантехник", "труб", "канализ", "водопровод", "унитаз", "раковин", "смесител", "ванн",
                        "душ", "инсталляц", "полотенцесуш", "водонагрев", "слив", "сифон",
                    ]),
                ),
                (Category::Doors, words(&["двер", "наличник"])),
                (Category::Windows, words(&["окно", "окон", "подоконник"])),
                (
                    Category::RoughWork,
                    words(&["черновой", "штроб", "бетон", "кладк", "кирпич", "пеноблок", "перегородк", "арматур", "опалубк"]),
                ),
            ],
            unit_aliases: vec![
                (Unit::SquareMeter, words(&["м²", "м2", "кв.м", "кв.м.", "м.кв", "кв м", "m2", "sqm", "sq.m"])),
                (Unit::LinearMeter, words(&["м.п.", "мп", "м.п", "п.м.", "п.м", "пог.м", "пм", "lm"])),
                (Unit::Piece, words(&["шт", "шт.", "штук", "штука", "pcs", "pc"])),
                (Unit::Point, words(&["точка", "точк", "точек", "тч", "point"])),
                (Unit::Set, words(&["компл", "компл.", "комплект", "set"])),
                (Unit::CubicMeter, words(&["м³", "м3", "куб.м", "куб м", "m3"])),
            ],
            unit_hints: vec![
                (
                    Unit::Piece,
                    words(&["двер", "унитаз", "раковин", "смесител", "ванн", "светильник"]),
                ),
                (
                    Unit::LinearMeter,
                    words(&["плинтус", "откос", "кабел", "провод"]),
                ),
                (
                    Unit::Point,
                    words(&["розетк", "выключател", "точка", "точек"]),
                ),
                (Unit::CubicMeter, words(&["вынос мусор", "вывоз мусор"])),
            ],
            currency_markers: vec![
                (Currency::Gel, words(&["₾", "gel", "лари"])),
                (Currency::Usd, words(&["$", "usd", "доллар"])),
                (Currency::Rub, words(&["₽", "руб", "rub"])),
            ],
            metadata: MetadataLabels {
                address: words(&["адрес", "объект", "address"]),
                customer: words(&["заказчик", "клиент", "customer"]),
                area: words(&["площадь", "area"]),
                area_unit: words(&["м", "sq"]),
            },
            rewrite_rules: vec![
                (r"штукатурка стен.*маяк", "штукатурка стен по маякам"),
                (r"шпакл[её]вка стен.*обо", "шпаклёвка стен под обои"),
                (r"шпакл[её]вка стен.*покраск", "шпаклёвка стен под покраску"),
                (r"поклейка.*обо", "поклейка обоев"),
                (r"покраска.*стен", "покраска стен"),
                (r"укладка.*плитк.*стен", "укладка плитки на стены"),
                (r"укладка.*плитк.*пол", "укладка плитки на пол"),
                (r"укладка.*ламинат", "укладка ламината"),
                (r"натяжн.*потол", "натяжной потолок"),
                (r"стяжк.*пол", "стяжка пола"),
                (r"наливн.*пол", "наливной пол"),
                (r"демонтаж.*обо", "демонтаж обоев"),
                (r"демонтаж.*плитк", "демонтаж плитки"),
                (r"гидроизол", "гидроизоляция пола"),
                (r"установк.*розетк", "установка розетки"),
                (r"установк.*выключател", "установка выключателя"),
                (r"установк.*унитаз", "установка унитаза"),
                (r"установк.*ванн", "установка ванны"),
                (r"установк.*раковин", "установка раковины"),
                (r"установк.*смесител", "установка смесителя"),
                (r"монтаж.*плинтус", "монтаж плинтусов"),
            ]
            .into_iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect(),
            materials: MaterialKeywords {
                labor_only: words(&[
                    "вынос", "мусор", "демонтаж", "снятие", "удаление", "разборка", "уборка", "очистка",
                    "мытьё", "мытье", "защита", "укрытие", "заклейка", "перенос", "погрузка", "разгрузка",
                    "штробление", "долбление",
                ]),
                consumables: words(&["грунтовка", "грунтование", "шпаклевка черновая", "штукатурка"]),
                material_heavy: words(&[
                    "плитка", "кафель", "ламинат", "паркет", "обои", "натяжной потолок", "сантехприбор",
                    "унитаз", "раковина", "ванна", "смеситель",
                ]),
            },
        }
    }
}

pub fn first_hit<K: Copy>(table: &[(K, Vec<String>)], haystack: &str) -> Option<K> {
    table
        .iter()
        .find(|(_, keywords)| contains_any(haystack, keywords))
        .map(|(key, _)| *key)
}

pub fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| haystack.contains(k.as_str()))
}

pub fn equals_any(value: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| value == k)
}
