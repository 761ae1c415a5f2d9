use hospital_review_dashboard::config::ColumnNames;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const STOPWORDS: &[&str] = &["yang", "dan", "di", "nya", "sangat", "saya", "sekali"];

/// Crude stand-ins for the precomputed preprocessing stages.
fn strip_stopwords(text: &str) -> String {
    text.split_whitespace()
        .filter(|w| !STOPWORDS.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn lemmatize(text: &str) -> String {
    text.split_whitespace()
        .map(|w| {
            w.strip_prefix("pe")
                .or_else(|| w.strip_prefix("me"))
                .filter(|rest| rest.len() > 3)
                .unwrap_or(w)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);

    let hospitals = [
        ("RSUP Dr. Kariadi", "A"),
        ("RS Telogorejo", "B"),
        ("RS Roemani", "B"),
        ("RSUD K.R.M.T Wongsonegoro", "C"),
        ("RS Bhayangkara", "C"),
        ("RS Hermina Banyumanik", "D"),
    ];

    // (sentiment, emotions, sentences)
    let templates: [(&str, &[&str], &[&str]); 3] = [
        (
            "positif",
            &["bahagia", "yakin", "antisipasi"],
            &[
                "Pelayanan sangat baik dan dokternya ramah",
                "Perawat yang cekatan dan ruangan bersih sekali",
                "Prosesnya cepat dan mudah saya puas",
                "Pelayanan baik saya berterimakasih karena telah disembuhkan",
            ],
        ),
        (
            "negatif",
            &["marah", "sedih", "jijik", "takut"],
            &[
                "Dokternya jutek dan tidak ramah",
                "Antrian sangat lama dan petugas tidak peduli",
                "Toilet kotor dan ruangan bau",
                "Pembayaran ribet dan mahal sekali",
            ],
        ),
        (
            "netral",
            &["terkejut", "antisipasi", "yakin"],
            &[
                "Parkir cukup luas di depan gedung",
                "Pendaftaran bisa lewat aplikasi",
                "Jam besuk dibatasi sore hari",
            ],
        ),
    ];

    let columns = ColumnNames::default();
    let output_path = "sample_reviews.csv";
    let mut writer = csv::Writer::from_path(output_path)?;
    writer.write_record([
        &columns.raw_text,
        &columns.case_folded,
        &columns.stopword_removed,
        &columns.lemmatized,
        &columns.hospital,
        &columns.hospital_type,
        &columns.sentiment,
        &columns.emotion,
    ])?;

    let mut rows = 0;
    for (hospital, hospital_type) in &hospitals {
        let n = 20 + (rng.next_u64() % 30) as usize;
        for _ in 0..n {
            // Skew towards positive reviews: 0-4 positif, 5-7 negatif, 8-9 netral.
            let idx = match rng.next_u64() % 10 {
                0..=4 => 0,
                5..=7 => 1,
                _ => 2,
            };
            let (sentiment, emotions, sentences) = templates[idx];
            let raw = rng.pick(sentences);
            let folded = raw.to_lowercase();
            let no_stop = strip_stopwords(&folded);
            let lemma = lemmatize(&no_stop);
            let emotion = rng.pick(emotions);

            writer.write_record([
                raw,
                &folded,
                &no_stop,
                &lemma,
                hospital,
                hospital_type,
                sentiment,
                emotion,
            ])?;
            rows += 1;
        }
    }
    writer.flush()?;

    println!(
        "Wrote {rows} reviews for {} hospitals to {output_path}",
        hospitals.len()
    );
    Ok(())
}
